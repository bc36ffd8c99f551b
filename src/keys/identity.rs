use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use age::secrecy::ExposeSecret;

use super::paths::KeyPaths;
use super::store::DirectoryKey;

/// The author's own age keypair. The public half is what recipients' copies
/// of every sent message are also encrypted to.
pub struct AuthorIdentity {
    pub age_identity: age::x25519::Identity,
    pub age_recipient: age::x25519::Recipient,
}

impl AuthorIdentity {
    /// Generate a new keypair.
    pub fn generate() -> Self {
        let age_identity = age::x25519::Identity::generate();
        let age_recipient = age_identity.to_public();
        Self {
            age_identity,
            age_recipient,
        }
    }

    /// Load the author identity from the key directory.
    pub fn load(paths: &KeyPaths) -> Result<Self> {
        if !paths.is_initialized() {
            bail!("no author key found. Run `sealpost keys init` first.");
        }

        let age_key_str = std::fs::read_to_string(paths.private_key_path())
            .context("failed to read age private key")?;
        let age_identity: age::x25519::Identity = age_key_str
            .trim()
            .parse()
            .map_err(|e: &str| anyhow::anyhow!("{}", e))?;
        let age_recipient = age_identity.to_public();

        Ok(Self {
            age_identity,
            age_recipient,
        })
    }

    /// Save this identity to the key directory.
    pub fn save(&self, paths: &KeyPaths) -> Result<()> {
        paths.ensure_dirs()?;

        let age_sk_str = self.age_identity.to_string();
        paths.write_private(&paths.private_key_path(), age_sk_str.expose_secret())?;

        std::fs::write(paths.public_key_path(), self.public_key())
            .context("failed to write age public key")?;

        Ok(())
    }

    /// The public key as published to the directory (`age1...`).
    pub fn public_key(&self) -> String {
        self.age_recipient.to_string()
    }

    /// The public key as a session key entry, id derived from the material.
    pub fn directory_key(&self) -> DirectoryKey {
        DirectoryKey::from_material(self.public_key())
    }

    /// SHA256 fingerprint of the public key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.public_key())
    }
}

/// Compute a short SHA256 fingerprint for any public key material.
pub fn fingerprint(material: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(material.trim().as_bytes());
    let hash = hasher.finalize();
    format!("SHA256:{}", hex::encode(&hash[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generate_and_fingerprint() {
        let id = AuthorIdentity::generate();
        let fp = id.fingerprint();
        assert!(fp.starts_with("SHA256:"));
        assert_eq!(fp.len(), "SHA256:".len() + 32);
        assert!(id.public_key().starts_with("age1"));
    }

    #[test]
    fn directory_key_id_matches_material() {
        let id = AuthorIdentity::generate();
        let key = id.directory_key();
        assert_eq!(key.material, id.public_key());
        assert_eq!(
            key.key_id,
            crate::keys::store::KeyId::from_material(&id.public_key())
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let paths = KeyPaths::open_at(dir.path().to_path_buf());

        let id = AuthorIdentity::generate();
        id.save(&paths).unwrap();
        assert!(paths.is_initialized());

        let loaded = AuthorIdentity::load(&paths).unwrap();
        assert_eq!(id.public_key(), loaded.public_key());
        assert_eq!(id.fingerprint(), loaded.fingerprint());

        let published = std::fs::read_to_string(paths.public_key_path()).unwrap();
        assert_eq!(published, id.public_key());
    }

    #[test]
    fn load_without_init_errors() {
        let dir = TempDir::new().unwrap();
        let paths = KeyPaths::open_at(dir.path().to_path_buf());
        let err = AuthorIdentity::load(&paths).err().unwrap();
        assert!(err.to_string().contains("keys init"));
    }

    #[cfg(unix)]
    #[test]
    fn private_key_has_restricted_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let paths = KeyPaths::open_at(dir.path().to_path_buf());

        AuthorIdentity::generate().save(&paths).unwrap();

        let perms = std::fs::metadata(paths.private_key_path())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(perms, 0o600);
    }
}
