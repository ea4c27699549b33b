//! Registry credentials

use std::fmt;

/// Access key pair for one registry account.
///
/// The secret never reaches `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredential {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl RegistryCredential {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for RegistryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}
