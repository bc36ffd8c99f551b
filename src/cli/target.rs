//! Directory and session settings shared by the commands that talk to a
//! directory. Flags (and their `SEALPOST_*` env vars) win over the config file.

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::directory::http::HttpDirectory;
use crate::keys::identity::AuthorIdentity;
use crate::keys::paths::KeyPaths;
use crate::session::{Credentials, Session, SessionContext};

#[derive(Args, Debug, Clone, Default)]
pub struct DirectoryArgs {
    /// Key directory URL
    #[arg(long, env = "SEALPOST_DIRECTORY")]
    pub directory: Option<String>,

    /// Your person id at the directory
    #[arg(long, env = "SEALPOST_PERSON_ID")]
    pub person_id: Option<String>,

    /// Your verified session id at the directory
    #[arg(long, env = "SEALPOST_SESSION_ID")]
    pub session_id: Option<String>,
}

impl DirectoryArgs {
    pub fn credentials(&self, config: &Config) -> Result<Credentials> {
        let person_id = self
            .person_id
            .clone()
            .or_else(|| config.session.person_id.clone())
            .context("no person id. Pass --person-id or set [session] person_id")?;
        let session_id = self
            .session_id
            .clone()
            .or_else(|| config.session.session_id.clone())
            .context("no session id. Pass --session-id or set [session] session_id")?;
        Ok(Credentials {
            person_id,
            session_id,
        })
    }

    pub fn connect(&self, config: &Config) -> Result<HttpDirectory> {
        let url = self
            .directory
            .as_deref()
            .or(config.directory.url.as_deref())
            .context("no directory URL. Pass --directory or set [directory] url")?;
        HttpDirectory::new(url, self.credentials(config)?, config.directory_timeout())
    }
}

/// Start a session for the author, seeding the key cache with the local
/// author key.
pub fn start_session(
    args: &DirectoryArgs,
    author: Option<&str>,
    config: &Config,
) -> Result<(Session, AuthorIdentity)> {
    let author = author
        .or(config.session.author.as_deref())
        .context("no author. Pass --author or set [session] author")?;

    let paths = KeyPaths::open()?;
    let identity = AuthorIdentity::load(&paths)?;

    let session = Session::start(SessionContext {
        credentials: args.credentials(config)?,
        author: author.to_string(),
        author_keys: vec![identity.directory_key()],
    });
    Ok((session, identity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_win_over_config() {
        let mut config = Config::default();
        config.session.person_id = Some("p-config".to_string());
        config.session.session_id = Some("s-config".to_string());

        let args = DirectoryArgs {
            person_id: Some("p-flag".to_string()),
            ..Default::default()
        };
        let creds = args.credentials(&config).unwrap();
        assert_eq!(creds.person_id, "p-flag");
        assert_eq!(creds.session_id, "s-config");
    }

    #[test]
    fn missing_session_is_an_error() {
        let args = DirectoryArgs::default();
        let err = args.credentials(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("person id"));
    }

    #[test]
    fn missing_url_is_an_error() {
        let mut config = Config::default();
        config.session.person_id = Some("p".to_string());
        config.session.session_id = Some("s".to_string());
        let err = DirectoryArgs::default().connect(&config).err().unwrap();
        assert!(err.to_string().contains("directory URL"));
    }
}
