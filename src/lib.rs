//! # sealpost
//!
//! Resolve every public key a recipient has registered and encrypt a
//! message to all of them, plus the author.

pub mod cli;
pub mod compose;
pub mod config;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod keys;
pub mod notify;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod ui;
