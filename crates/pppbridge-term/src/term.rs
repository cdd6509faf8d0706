//! In-memory representation of a term.

/// A term of the supported subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// An atom, held as its text.
    Atom(String),
    /// An opaque byte string.
    Binary(Vec<u8>),
    /// A proper list. The empty list is `List(vec![])`.
    List(Vec<Term>),
    /// A fixed-arity tuple.
    Tuple(Vec<Term>),
    /// A map in insertion order.
    Map(Vec<(Term, Term)>),
}

impl Term {
    /// Builds an atom from Latin-1 bytes, as C environment names are read.
    ///
    /// Every byte maps to the code point of the same value, so arbitrary
    /// input produces a valid atom text.
    #[must_use]
    pub fn atom_latin1(bytes: &[u8]) -> Self {
        Self::Atom(bytes.iter().map(|&b| char::from(b)).collect())
    }

    /// Builds a binary from any byte slice.
    #[must_use]
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Builds a list of binaries.
    #[must_use]
    pub fn binary_list<I, B>(items: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self::List(items.into_iter().map(Self::binary).collect())
    }

    /// Returns the bytes of a binary term.
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements of a list term.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up an atom key in a map term.
    #[must_use]
    pub fn map_get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(pairs) => pairs.iter().find_map(|(k, v)| match k {
                Self::Atom(name) if name == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_latin1_maps_high_bytes_to_code_points() {
        assert_eq!(Term::atom_latin1(b"caf\xe9"), Term::Atom("caf\u{e9}".into()));
    }

    #[test]
    fn map_get_finds_atom_keys_only() {
        let map = Term::Map(vec![
            (Term::Atom("IFNAME".into()), Term::binary("ppp0")),
            (Term::binary("SPEED"), Term::binary("115200")),
        ]);
        assert_eq!(map.map_get("IFNAME"), Some(&Term::binary("ppp0")));
        assert_eq!(map.map_get("SPEED"), None);
    }
}
