//! Term serialization.

use pppbridge_common::constants::MAX_ATOM_CHARS;
use pppbridge_common::error::{BridgeError, Result};

use crate::tag;
use crate::term::Term;

/// Serializes `term` with the leading version byte.
///
/// # Errors
///
/// Returns `BridgeError::TermTooLarge` if a length does not fit its wire
/// field or an atom has more than 255 characters or a code point above 255.
pub fn to_bytes(term: &Term) -> Result<Vec<u8>> {
    let mut buf = vec![tag::VERSION];
    encode_into(term, &mut buf)?;
    tracing::trace!(bytes = buf.len(), "encoded term");
    Ok(buf)
}

/// Appends the encoding of `term` to `buf`, without a version byte.
///
/// On error `buf` may hold a partial encoding and should be discarded.
///
/// # Errors
///
/// See [`to_bytes`].
pub fn encode_into(term: &Term, buf: &mut Vec<u8>) -> Result<()> {
    match term {
        Term::Atom(name) => encode_atom(name, buf),
        Term::Binary(bytes) => {
            buf.push(tag::BINARY_EXT);
            buf.extend_from_slice(&wire_u32("binary", bytes.len())?.to_be_bytes());
            buf.extend_from_slice(bytes);
            Ok(())
        }
        Term::List(items) => {
            if items.is_empty() {
                buf.push(tag::NIL_EXT);
                return Ok(());
            }
            buf.push(tag::LIST_EXT);
            buf.extend_from_slice(&wire_u32("list", items.len())?.to_be_bytes());
            for item in items {
                encode_into(item, buf)?;
            }
            buf.push(tag::NIL_EXT);
            Ok(())
        }
        Term::Tuple(items) => {
            if let Ok(arity) = u8::try_from(items.len()) {
                buf.push(tag::SMALL_TUPLE_EXT);
                buf.push(arity);
            } else {
                buf.push(tag::LARGE_TUPLE_EXT);
                buf.extend_from_slice(&wire_u32("tuple", items.len())?.to_be_bytes());
            }
            for item in items {
                encode_into(item, buf)?;
            }
            Ok(())
        }
        Term::Map(pairs) => {
            buf.push(tag::MAP_EXT);
            buf.extend_from_slice(&wire_u32("map", pairs.len())?.to_be_bytes());
            for (key, value) in pairs {
                encode_into(key, buf)?;
                encode_into(value, buf)?;
            }
            Ok(())
        }
    }
}

fn encode_atom(name: &str, buf: &mut Vec<u8>) -> Result<()> {
    let chars = name.chars().count();
    if chars > MAX_ATOM_CHARS {
        return Err(BridgeError::TermTooLarge {
            what: "atom",
            len: chars,
        });
    }
    if let Some(c) = name.chars().find(|&c| u32::from(c) > 0xff) {
        return Err(BridgeError::TermTooLarge {
            what: "atom code point",
            len: c as usize,
        });
    }

    let bytes = name.as_bytes();
    if let Ok(len) = u8::try_from(bytes.len()) {
        buf.push(tag::SMALL_ATOM_UTF8_EXT);
        buf.push(len);
    } else {
        // 255 Latin-1 characters encode to at most 510 bytes.
        let len = u16::try_from(bytes.len()).map_err(|_| BridgeError::TermTooLarge {
            what: "atom",
            len: bytes.len(),
        })?;
        buf.push(tag::ATOM_UTF8_EXT);
        buf.extend_from_slice(&len.to_be_bytes());
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

fn wire_u32(what: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| BridgeError::TermTooLarge { what, len })
}
