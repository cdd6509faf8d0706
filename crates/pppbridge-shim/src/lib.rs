//! # pppbridge-shim
//!
//! Preloaded into `pppd` so that the hook scripts it looks up under
//! `/etc/ppp` are taken from a supervisor-owned directory instead.
//!
//! `pppd` checks a script with `stat` and then runs it with `execve`. Those
//! two calls, and nothing else, are intercepted:
//! - [`redirect`] holds the path rewrite, independent of any interception.
//! - `interpose` exports the replacement symbols and forwards to libc.
//!
//! The private directory is read from `PRIV_DIR` once, when the library
//! is loaded.

#![allow(unsafe_code)]

#[cfg(all(target_os = "linux", not(test)))]
mod interpose;
pub mod redirect;
