//! # pppbridge-common
//!
//! Shared error definitions, constants, configuration model, and the
//! environment snapshot type used across the pppbridge workspace.
//!
//! This crate is the leaf of the dependency graph. Both the notification
//! helper and the preload shim build on it.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
