use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Args;
use is_terminal::IsTerminal;

use super::target::{start_session, DirectoryArgs};
use super::Reported;
use crate::compose::{ComposeSession, LookupOutcome};
use crate::config::Config;
use crate::error::ComposeError;
use crate::notify::TerminalSink;
use crate::ui::display;

#[derive(Args)]
pub struct ComposeArgs {
    /// Recipient email address (repeatable)
    #[arg(long = "to", short = 't')]
    pub recipients: Vec<String>,

    /// Message text (prefer piping or --file; this lands in shell history)
    #[arg(long, short, conflicts_with = "file")]
    pub message: Option<String>,

    /// Read the message from a file
    #[arg(long, short)]
    pub file: Option<String>,

    /// Your email address
    #[arg(long, env = "SEALPOST_AUTHOR")]
    pub author: Option<String>,

    /// Send the message without encrypting it
    #[arg(long)]
    pub plain: bool,

    /// Post the message to the directory instead of printing it
    #[arg(long)]
    pub post: bool,

    #[command(flatten)]
    pub target: DirectoryArgs,
}

pub async fn run(args: ComposeArgs, config: &Config, quiet: bool) -> Result<()> {
    let directory = args.target.connect(config)?;
    let (mut session, _identity) = start_session(&args.target, args.author.as_deref(), config)?;
    let sink = TerminalSink;
    let mut compose = ComposeSession::new(&mut session, &directory, &sink);

    let interactive = std::io::stdin().is_terminal();
    let recipients = if args.recipients.is_empty() && interactive {
        prompt_recipients()?
    } else {
        args.recipients.clone()
    };
    if recipients.is_empty() {
        bail!("no recipients. Pass --to <email>");
    }

    compose.show_recipient_input();
    for recipient in &recipients {
        let spinner = display::spinner(&format!("looking up {}...", recipient));
        let result = compose.lookup(recipient).await;
        spinner.finish_and_clear();

        match result {
            Ok(LookupOutcome::Found {
                identifier,
                recorded,
            }) => {
                if !quiet {
                    display::ok(&format!(
                        "{} added ({} new key(s))",
                        identifier, recorded.new_keys
                    ));
                }
            }
            // The sink has already pointed the user at the upload path.
            Ok(LookupOutcome::NoKeys { .. }) => {}
            Err(e) => return Err(abort(e)),
        }
    }

    let text = read_message(args.message.as_deref(), args.file.as_deref(), interactive)?;
    compose.edit_message(&text).map_err(abort)?;

    if !args.plain {
        let spinner = display::spinner("encrypting...");
        let result = compose.encrypt().await;
        spinner.finish_and_clear();
        result.map_err(abort)?;
    }

    let submission = compose.submit().map_err(abort)?;

    if args.post {
        let reply = directory.post_message(&submission).await?;
        if !quiet {
            display::ok(&reply);
        }
        compose.reset();
    } else {
        print!("{}", submission.message);
        if !submission.message.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

/// Failures that reach the sink are already shown and become [`Reported`].
fn abort(err: ComposeError) -> anyhow::Error {
    tracing::debug!("compose aborted: {}", err);
    match err {
        ComposeError::LookupInFlight
        | ComposeError::EncryptInFlight
        | ComposeError::MessageFrozen
        | ComposeError::SubmitDisabled => err.into(),
        _ => Reported.into(),
    }
}

fn prompt_recipients() -> Result<Vec<String>> {
    let mut recipients = Vec::new();
    loop {
        let input: String = dialoguer::Input::new()
            .with_prompt("Recipient email (blank to finish)")
            .allow_empty(true)
            .interact_text()?;
        let input = input.trim();
        if input.is_empty() {
            break;
        }
        recipients.push(input.to_string());
    }
    Ok(recipients)
}

/// Message text. Priority: --message > --file > stdin pipe > prompt.
fn read_message(message: Option<&str>, file: Option<&str>, interactive: bool) -> Result<String> {
    if let Some(message) = message {
        return Ok(message.to_string());
    }

    if let Some(file) = file {
        return std::fs::read_to_string(file).with_context(|| format!("failed to read '{}'", file));
    }

    if !interactive {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let text: String = dialoguer::Input::new()
        .with_prompt("Message")
        .allow_empty(true)
        .interact_text()?;
    Ok(text)
}
