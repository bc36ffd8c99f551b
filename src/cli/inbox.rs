use anyhow::Result;
use clap::Args;

use super::target::DirectoryArgs;
use super::Reported;
use crate::config::Config;
use crate::crypto::armor;
use crate::directory::wire::WireMessage;
use crate::keys::identity::AuthorIdentity;
use crate::keys::paths::KeyPaths;
use crate::notify::{NotificationSink, TerminalSink};
use crate::ui::display;

#[derive(Args)]
pub struct InboxArgs {
    /// Print armored messages as they are instead of decrypting them
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub target: DirectoryArgs,
}

/// A listed message body, after trying the author key on it.
#[derive(Debug, PartialEq, Eq)]
enum Body {
    Plain(String),
    Decrypted(String),
    /// Armored, but not to any key we hold.
    Sealed,
}

fn open_body(message: &WireMessage, identity: Option<&AuthorIdentity>) -> Body {
    if !armor::is_armored(&message.message) {
        return Body::Plain(message.message.clone());
    }
    let Some(identity) = identity else {
        return Body::Sealed;
    };
    match armor::open(&message.message, &identity.age_identity) {
        Ok(plaintext) => Body::Decrypted(plaintext),
        Err(e) => {
            tracing::debug!(id = %message.id, "cannot decrypt message: {}", e);
            Body::Sealed
        }
    }
}

pub async fn run(args: InboxArgs, config: &Config) -> Result<()> {
    let directory = args.target.connect(config)?;

    let spinner = display::spinner("fetching messages...");
    let result = directory.latest_messages().await;
    spinner.finish_and_clear();

    let messages = match result {
        Ok(messages) => messages,
        Err(e) => {
            TerminalSink.show_error(&e.to_string());
            return Err(Reported.into());
        }
    };

    if messages.is_empty() {
        display::ok("no messages");
        return Ok(());
    }

    let identity = if args.raw {
        None
    } else {
        Some(AuthorIdentity::load(&KeyPaths::open()?)?)
    };

    for message in &messages {
        println!("--- {} from {}", message.id, message.author);
        println!("    to: {}", message.recipients.join(", "));
        match open_body(message, identity.as_ref()) {
            Body::Plain(text) | Body::Decrypted(text) => println!("{}", text.trim_end()),
            Body::Sealed if args.raw => println!("{}", message.message.trim_end()),
            Body::Sealed => println!("[encrypted to keys you don't hold]"),
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(body: &str) -> WireMessage {
        WireMessage {
            id: "m1".to_string(),
            author: "me@x.com".to_string(),
            message: body.to_string(),
            recipients: vec!["alice@x.com".to_string()],
        }
    }

    #[test]
    fn plain_messages_pass_through() {
        let body = open_body(&listed("hello"), None);
        assert_eq!(body, Body::Plain("hello".to_string()));
    }

    #[test]
    fn armored_messages_are_opened_with_the_author_key() {
        let me = AuthorIdentity::generate();
        let armored = armor::seal("for my eyes", &[me.public_key()]).unwrap();
        let body = open_body(&listed(&armored), Some(&me));
        assert_eq!(body, Body::Decrypted("for my eyes".to_string()));
    }

    #[test]
    fn foreign_ciphertext_stays_sealed() {
        let other = AuthorIdentity::generate();
        let me = AuthorIdentity::generate();
        let armored = armor::seal("not for me", &[other.public_key()]).unwrap();
        assert_eq!(open_body(&listed(&armored), Some(&me)), Body::Sealed);
        assert_eq!(open_body(&listed(&armored), None), Body::Sealed);
    }
}
