use chrono::{DateTime, Utc};
use keyring::Entry;

use crate::warning;

/// Keyring service name all secrets are stored under.
const KEYRING_SERVICE: &str = "sptopcli.spotify.auth";

/// Logical key for the current access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Logical key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Logical key for the access token expiration timestamp.
pub const EXPIRATION_DATE_KEY: &str = "expiration_date";
/// Logical key for the in-flight PKCE code verifier.
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

/// Durable keyed storage for secrets.
///
/// `save` upserts, `load` returns `None` for a missing key instead of
/// failing, and `delete` is idempotent. Backends must never panic on
/// storage trouble: a failed save simply means the next load reports the
/// value as absent, which the auth service treats as "re-authenticate".
pub trait SecretStore: Send + Sync {
    fn save(&self, key: &str, value: &str);
    fn load(&self, key: &str) -> Option<String>;
    fn delete(&self, key: &str);
}

/// [`SecretStore`] backed by the operating system keyring (macOS
/// Keychain, Windows Credential Manager, Secret Service on Linux), so
/// tokens never land in plain preference files.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        KeyringStore {
            service: KEYRING_SERVICE.to_string(),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn save(&self, key: &str, value: &str) {
        match Entry::new(&self.service, key) {
            Ok(entry) => {
                if let Err(e) = entry.set_password(value) {
                    warning!("Failed to store '{}' in the system keyring: {}", key, e);
                }
            }
            Err(e) => warning!("Failed to open keyring entry '{}': {}", key, e),
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        Entry::new(&self.service, key).ok()?.get_password().ok()
    }

    fn delete(&self, key: &str) {
        if let Ok(entry) = Entry::new(&self.service, key) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => warning!("Failed to delete '{}' from the system keyring: {}", key, e),
            }
        }
    }
}

/// Typed facade over a [`SecretStore`] for the four secrets the auth
/// service works with. The store is the only owner of persisted
/// credentials; the service reads through it on every decision instead of
/// caching tokens.
pub struct TokenStore {
    backend: Box<dyn SecretStore>,
}

impl TokenStore {
    pub fn new(backend: Box<dyn SecretStore>) -> Self {
        TokenStore { backend }
    }

    pub fn save_access_token(&self, token: &str) {
        self.backend.save(ACCESS_TOKEN_KEY, token);
    }

    pub fn load_access_token(&self) -> Option<String> {
        self.backend.load(ACCESS_TOKEN_KEY)
    }

    pub fn delete_access_token(&self) {
        self.backend.delete(ACCESS_TOKEN_KEY);
    }

    pub fn save_refresh_token(&self, token: &str) {
        self.backend.save(REFRESH_TOKEN_KEY, token);
    }

    pub fn load_refresh_token(&self) -> Option<String> {
        self.backend.load(REFRESH_TOKEN_KEY)
    }

    pub fn delete_refresh_token(&self) {
        self.backend.delete(REFRESH_TOKEN_KEY);
    }

    /// Stores the expiration as epoch seconds.
    pub fn save_expiration(&self, when: DateTime<Utc>) {
        self.backend
            .save(EXPIRATION_DATE_KEY, &when.timestamp().to_string());
    }

    /// Loads the stored expiration timestamp. An unparsable value is
    /// treated as absent, which forces a refresh instead of a crash.
    pub fn load_expiration(&self) -> Option<DateTime<Utc>> {
        let raw = self.backend.load(EXPIRATION_DATE_KEY)?;
        let seconds = raw.parse::<i64>().ok()?;
        DateTime::from_timestamp(seconds, 0)
    }

    pub fn delete_expiration(&self) {
        self.backend.delete(EXPIRATION_DATE_KEY);
    }

    pub fn save_code_verifier(&self, verifier: &str) {
        self.backend.save(CODE_VERIFIER_KEY, verifier);
    }

    pub fn load_code_verifier(&self) -> Option<String> {
        self.backend.load(CODE_VERIFIER_KEY)
    }

    pub fn delete_code_verifier(&self) {
        self.backend.delete(CODE_VERIFIER_KEY);
    }

    /// The single logout/reset primitive: removes every stored secret.
    pub fn clear_all(&self) {
        self.delete_access_token();
        self.delete_refresh_token();
        self.delete_expiration();
        self.delete_code_verifier();
    }
}
