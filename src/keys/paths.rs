use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Environment variable that relocates the key directory (tests, containers).
pub const HOME_ENV: &str = "SEALPOST_HOME";

/// Manages the `~/.config/sealpost/keys/` directory and file layout.
pub struct KeyPaths {
    base_dir: PathBuf,
}

impl KeyPaths {
    /// Open the key directory: `$SEALPOST_HOME` if set, else the platform config directory.
    pub fn open() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Ok(Self::open_at(PathBuf::from(home)));
        }
        let dirs = ProjectDirs::from("dev", "sealpost", "sealpost")
            .context("could not determine config directory")?;
        Ok(Self::open_at(dirs.config_dir().to_path_buf()))
    }

    /// Open the key directory at a specific location (for testing).
    pub fn open_at(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Ensure the key directory exists.
    pub fn ensure_dirs(&self) -> Result<()> {
        let keys_dir = self.keys_dir();
        std::fs::create_dir_all(&keys_dir)
            .with_context(|| format!("failed to create {}", keys_dir.display()))?;
        Ok(())
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.base_dir.join("keys")
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.keys_dir().join("author.age.key")
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.keys_dir().join("author.age.pub")
    }

    /// Check whether the author key has been generated.
    pub fn is_initialized(&self) -> bool {
        self.private_key_path().exists()
    }

    /// Write a file with restrictive permissions (0600) for private keys.
    pub fn write_private(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}
