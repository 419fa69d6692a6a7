use aes_gcm::AesGcm;
use aes_gcm::aead::Aead;
use aes_gcm::aead::AeadCore;
use aes_gcm::aead::KeyInit;
use aes_gcm::aead::OsRng;
use aes_gcm::aead::consts::U16;
use aes_gcm::aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use crate::error::SettingsError;

/// AES-256-GCM with a 16-byte nonce; stored blobs are
/// `base64(nonce ‖ tag ‖ ciphertext)`.
type Cipher = AesGcm<Aes256, U16>;

const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;
const MIN_PASSPHRASE_LEN: usize = 16;

/// Fixed KDF salt: the derived key must be stable across restarts so
/// previously stored blobs keep decrypting.
const KEY_SALT: &[u8] = b"planmate-credentials";

/// Symmetric sealer for per-user secrets (tracker token, chat credentials,
/// wiki password).
///
/// Constructed once at startup from the server passphrase and shared
/// read-only by every request. Each `encrypt` draws a fresh random nonce, so
/// encrypting the same plaintext twice yields different blobs; secret
/// comparison therefore always happens against plaintext (the masking
/// sentinel), never against ciphertext.
pub struct CredentialStore {
    key: [u8; KEY_LEN],
}

impl CredentialStore {
    /// Derive the process-wide key from the configured passphrase.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, SettingsError> {
        if passphrase.len() < MIN_PASSPHRASE_LEN {
            return Err(SettingsError::Config(format!(
                "encryption passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
            )));
        }
        let params = scrypt::Params::new(14, 8, 1, KEY_LEN)
            .map_err(|e| SettingsError::Config(e.to_string()))?;
        let mut key = [0u8; KEY_LEN];
        scrypt::scrypt(passphrase.as_bytes(), KEY_SALT, &params, &mut key)
            .map_err(|e| SettingsError::Config(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, SettingsError> {
        let cipher = Cipher::new_from_slice(&self.key).map_err(|_| SettingsError::Crypto)?;
        let nonce = Cipher::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| SettingsError::Crypto)?;
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(tag);
        blob.extend_from_slice(ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Open a stored blob. Malformed, truncated or tampered input yields
    /// `None`, never an error: callers treat `None` as "no usable
    /// credential".
    pub fn decrypt(&self, stored: &str) -> Option<String> {
        let blob = BASE64.decode(stored.trim()).ok()?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return None;
        }
        let (nonce, rest) = blob.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let mut sealed = Vec::with_capacity(rest.len());
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        let cipher = Cipher::new_from_slice(&self.key).ok()?;
        let opened = match cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), sealed.as_slice()) {
            Ok(opened) => opened,
            Err(_) => {
                warn!("stored secret failed authentication, treating as unusable");
                return None;
            }
        };
        String::from_utf8(opened).ok()
    }

    /// Effective accessor: stored values that predate encryption-at-rest are
    /// kept readable by falling back to the raw input when decryption fails.
    pub fn reveal(&self, stored: &str) -> String {
        self.decrypt(stored)
            .unwrap_or_else(|| stored.to_owned())
    }
}
