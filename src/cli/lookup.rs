use anyhow::Result;
use clap::Args;

use super::target::DirectoryArgs;
use super::Reported;
use crate::config::Config;
use crate::directory::Directory;
use crate::keys::identity::fingerprint;
use crate::keys::normalize_identifier;
use crate::notify::{self, TerminalSink};
use crate::ui::display;

#[derive(Args)]
pub struct LookupArgs {
    /// Recipient email address
    pub email: String,

    #[command(flatten)]
    pub target: DirectoryArgs,
}

pub async fn run(args: LookupArgs, config: &Config) -> Result<()> {
    let directory = args.target.connect(config)?;
    let email = normalize_identifier(&args.email);

    let spinner = display::spinner(&format!("looking up {}...", email));
    let result = directory.lookup(&email).await;
    spinner.finish_and_clear();

    let keys = match result {
        Ok(keys) => keys,
        Err(e) => {
            notify::report(&TerminalSink, &crate::error::ComposeError::Lookup(e));
            return Err(Reported.into());
        }
    };

    if keys.is_empty() {
        notify::report_no_keys(&TerminalSink, &email);
        return Ok(());
    }

    display::ok(&format!("{} key(s) for {}", keys.len(), email));
    for key in &keys {
        println!("  {}  {}", key.key_id, fingerprint(&key.material));
    }
    Ok(())
}
