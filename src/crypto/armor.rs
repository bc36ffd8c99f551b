use std::io::{Read, Write};

use anyhow::{bail, Context, Result};

const ARMOR_BEGIN: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` to every public key in `public_keys` and return
/// ASCII-armored ciphertext any one of them can decrypt.
///
/// Every key is parsed before anything is written, and the output buffer is
/// only returned once the age stream and the armor are both finalized.
pub fn seal(plaintext: &str, public_keys: &[String]) -> Result<String> {
    if public_keys.is_empty() {
        bail!("at least one public key is required for encryption");
    }

    let recipients = public_keys
        .iter()
        .map(|k| parse_public_key(k))
        .collect::<Result<Vec<_>>>()?;

    let encryptor =
        age::Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn age::Recipient))
            .map_err(|e| anyhow::anyhow!("failed to set up age recipients: {}", e))?;

    let mut encrypted = vec![];
    let armored = age::armor::ArmoredWriter::wrap_output(
        &mut encrypted,
        age::armor::Format::AsciiArmor,
    )
    .context("failed to create armor writer")?;
    let mut writer = encryptor
        .wrap_output(armored)
        .context("failed to create age encryptor")?;

    writer
        .write_all(plaintext.as_bytes())
        .context("failed to write age ciphertext")?;
    writer
        .finish()
        .and_then(|armor| armor.finish())
        .context("failed to finalize age encryption")?;

    String::from_utf8(encrypted).context("armored ciphertext is not valid UTF-8")
}

// ---------------------------------------------------------------------------
// Decryption (author side)
// ---------------------------------------------------------------------------

/// Decrypt armored ciphertext with the given identity.
pub fn open(armored: &str, identity: &age::x25519::Identity) -> Result<String> {
    if !is_armored(armored) {
        bail!("input is not an armored age message");
    }

    let reader = age::armor::ArmoredReader::new(armored.trim().as_bytes());
    let decryptor = age::Decryptor::new(reader).context("failed to read age header")?;

    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| anyhow::anyhow!("age decryption failed: {}", e))?;

    let mut plaintext = vec![];
    reader
        .read_to_end(&mut plaintext)
        .context("failed to read decrypted data")?;

    String::from_utf8(plaintext).context("decrypted message is not valid UTF-8")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse public key material into an age recipient.
pub fn parse_public_key(material: &str) -> Result<age::x25519::Recipient> {
    material
        .trim()
        .parse()
        .map_err(|e: &str| anyhow::anyhow!("invalid public key: {}", e))
}

/// Check whether text looks like armored age ciphertext.
pub fn is_armored(text: &str) -> bool {
    text.trim_start().starts_with(ARMOR_BEGIN)
}
