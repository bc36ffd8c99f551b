pub mod compose;
pub mod decrypt;
pub mod inbox;
pub mod keys;
pub mod lookup;
#[cfg(feature = "server")]
pub mod serve;
pub mod target;

use clap::{Parser, Subcommand};
use thiserror::Error;

/// A failure that has already been shown to the user. `main` only turns it
/// into a non-zero exit status.
#[derive(Debug, Error)]
#[error("error already reported")]
pub struct Reported;

#[derive(Parser)]
#[command(
    name = "sealpost",
    about = "Compose messages encrypted to every key a recipient has registered"
)]
#[command(version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show debug output (never prints message contents)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Minimal output (for scripting)
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Path to sealpost.toml
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage the author keypair
    Keys(keys::KeysArgs),

    /// Show the public keys the directory has for a recipient
    Lookup(lookup::LookupArgs),

    /// Encrypt a message to its recipients and post it
    Compose(compose::ComposeArgs),

    /// List the latest messages you sent or received, decrypted where possible
    Inbox(inbox::InboxArgs),

    /// Decrypt an armored message with the author key
    Decrypt(decrypt::DecryptArgs),

    /// Run a key directory server
    #[cfg(feature = "server")]
    Serve(serve::ServeArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
