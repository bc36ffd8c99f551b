use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::keys::identity::AuthorIdentity;
use crate::keys::paths::KeyPaths;
use crate::ui::display;

#[derive(Parser)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Generate your keypair
    Init,

    /// Print your public key (upload it to the directory)
    Export,

    /// Show your key fingerprint
    Fingerprint,
}

pub fn run(args: KeysArgs) -> Result<()> {
    match args.command {
        KeysCommand::Init => cmd_init(),
        KeysCommand::Export => cmd_export(),
        KeysCommand::Fingerprint => cmd_fingerprint(),
    }
}

fn cmd_init() -> Result<()> {
    let paths = KeyPaths::open()?;

    if paths.is_initialized() {
        display::warning(
            "keys already initialized. Use 'sealpost keys export' to view your public key.",
        );
        return Ok(());
    }

    let identity = AuthorIdentity::generate();
    identity.save(&paths)?;

    display::ok("keypair generated");
    println!();
    println!("  fingerprint: {}", identity.fingerprint());
    println!("  keys stored in: {}", paths.keys_dir().display());
    println!();
    println!("Upload your public key to the directory: sealpost keys export");

    Ok(())
}

fn cmd_export() -> Result<()> {
    let paths = KeyPaths::open()?;
    let identity = AuthorIdentity::load(&paths)?;
    println!("{}", identity.public_key());
    Ok(())
}

fn cmd_fingerprint() -> Result<()> {
    let paths = KeyPaths::open()?;
    let identity = AuthorIdentity::load(&paths)?;
    println!("{}", identity.fingerprint());
    Ok(())
}
