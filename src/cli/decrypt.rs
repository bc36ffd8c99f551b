use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Args;
use is_terminal::IsTerminal;

use crate::crypto::armor;
use crate::keys::identity::AuthorIdentity;
use crate::keys::paths::KeyPaths;

#[derive(Args)]
pub struct DecryptArgs {
    /// Armored message file (reads stdin when omitted)
    pub file: Option<String>,
}

pub fn run(args: DecryptArgs) -> Result<()> {
    let armored = match &args.file {
        Some(file) => {
            std::fs::read_to_string(file).with_context(|| format!("failed to read '{}'", file))?
        }
        None => {
            if std::io::stdin().is_terminal() {
                bail!("no input. Pass a file or pipe an armored message");
            }
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    // Fail fast before touching the key directory.
    if !armor::is_armored(&armored) {
        bail!("input doesn't look like an armored age message");
    }

    let paths = KeyPaths::open()?;
    let identity = AuthorIdentity::load(&paths)?;
    let plaintext = armor::open(&armored, &identity.age_identity)?;

    print!("{}", plaintext);
    if !plaintext.ends_with('\n') {
        println!();
    }
    Ok(())
}
