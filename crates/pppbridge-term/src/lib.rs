//! # pppbridge-term
//!
//! The supervisor decodes notifications with `:erlang.binary_to_term/1`.
//! This crate covers exactly the term shapes the helper emits:
//! - **Atoms** for environment variable names.
//! - **Binaries** for arguments and values.
//! - **Lists**, **tuples**, and **maps** to structure them.
//!
//! [`encode`] produces the versioned byte stream; [`decode`] reads it back
//! and is used to verify what the encoder writes.

pub mod decode;
pub mod encode;
mod tag;
mod term;

pub use decode::from_bytes;
pub use encode::to_bytes;
pub use term::Term;
