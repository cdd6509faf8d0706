//! Term deserialization.
//!
//! Accepts everything [`crate::encode`] writes plus the Latin-1 atom tags an
//! older emulator may produce. Any other tag is rejected.

use pppbridge_common::error::{BridgeError, Result};

use crate::tag;
use crate::term::Term;

/// Parses a versioned byte stream holding exactly one term.
///
/// # Errors
///
/// Returns `BridgeError::Decode` on a missing version byte, an unsupported
/// tag, truncated input, an improper list, or trailing bytes.
pub fn from_bytes(bytes: &[u8]) -> Result<Term> {
    let mut reader = Reader { bytes, offset: 0 };
    let version = reader.u8()?;
    if version != tag::VERSION {
        return Err(reader.error_at(0, format!("expected version {}, got {version}", tag::VERSION)));
    }
    let term = reader.term()?;
    if reader.offset != bytes.len() {
        return Err(reader.error(format!("{} trailing bytes", bytes.len() - reader.offset)));
    }
    Ok(term)
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn term(&mut self) -> Result<Term> {
        let start = self.offset;
        match self.u8()? {
            tag::NIL_EXT => Ok(Term::List(Vec::new())),
            tag::BINARY_EXT => {
                let len = self.u32_len()?;
                Ok(Term::Binary(self.take(len)?.to_vec()))
            }
            tag::LIST_EXT => {
                let len = self.u32_len()?;
                let items = self.terms(len)?;
                let tail_at = self.offset;
                if self.u8()? != tag::NIL_EXT {
                    return Err(self.error_at(tail_at, "improper list tail".into()));
                }
                Ok(Term::List(items))
            }
            tag::SMALL_TUPLE_EXT => {
                let arity = usize::from(self.u8()?);
                Ok(Term::Tuple(self.terms(arity)?))
            }
            tag::LARGE_TUPLE_EXT => {
                let arity = self.u32_len()?;
                Ok(Term::Tuple(self.terms(arity)?))
            }
            tag::MAP_EXT => {
                let arity = self.u32_len()?;
                let mut pairs = Vec::new();
                for _ in 0..arity {
                    let key = self.term()?;
                    let value = self.term()?;
                    pairs.push((key, value));
                }
                Ok(Term::Map(pairs))
            }
            tag::SMALL_ATOM_UTF8_EXT => {
                let len = usize::from(self.u8()?);
                self.utf8_atom(len)
            }
            tag::ATOM_UTF8_EXT => {
                let len = usize::from(self.u16()?);
                self.utf8_atom(len)
            }
            tag::SMALL_ATOM_EXT => {
                let len = usize::from(self.u8()?);
                Ok(Term::atom_latin1(self.take(len)?))
            }
            tag::ATOM_EXT => {
                let len = usize::from(self.u16()?);
                Ok(Term::atom_latin1(self.take(len)?))
            }
            other => Err(self.error_at(start, format!("unsupported tag {other}"))),
        }
    }

    fn terms(&mut self, count: usize) -> Result<Vec<Term>> {
        // Every term is at least one byte; cap the reservation by what is left.
        let mut items = Vec::with_capacity(count.min(self.bytes.len() - self.offset));
        for _ in 0..count {
            items.push(self.term()?);
        }
        Ok(items)
    }

    fn utf8_atom(&mut self, len: usize) -> Result<Term> {
        let start = self.offset;
        let raw = self.take(len)?;
        let text = std::str::from_utf8(raw)
            .map_err(|e| self.error_at(start, format!("atom is not UTF-8: {e}")))?;
        Ok(Term::Atom(text.to_owned()))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.error(format!("need {len} bytes, input truncated")))?;
        let bytes = self.bytes;
        let slice = &bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let raw = self.take(2)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    fn u32_len(&mut self) -> Result<usize> {
        let raw = self.take(4)?;
        let len = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        usize::try_from(len).map_err(|_| self.error(format!("length {len} overflows usize")))
    }

    fn error(&self, message: String) -> BridgeError {
        self.error_at(self.offset, message)
    }

    #[allow(clippy::unused_self)]
    fn error_at(&self, offset: usize, message: String) -> BridgeError {
        BridgeError::Decode { offset, message }
    }
}
