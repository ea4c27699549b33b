//! docker login against a registry

use crate::api::RegistryApi;
use crate::error::{RegistryError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shipyard_container::DockerCli;
use shipyard_core::SecretMasker;

/// Log `docker` in to `registry` with a token from `api`.
///
/// The password is masked before it is passed to any command.
pub async fn login(
    api: &dyn RegistryApi,
    docker: &DockerCli,
    masker: &dyn SecretMasker,
    registry: &str,
) -> Result<()> {
    let token = api
        .authorization_token()
        .await
        .map_err(|e| RegistryError::AuthenticationFailed {
            registry: registry.to_string(),
            reason: e.to_string(),
        })?;
    let (user, password) = decode_token(&token).map_err(|reason| {
        RegistryError::AuthenticationFailed {
            registry: registry.to_string(),
            reason,
        }
    })?;

    masker.mask(&password);

    docker
        .login(&user, &password, registry)
        .await
        .map_err(|source| RegistryError::LoginFailed {
            registry: registry.to_string(),
            source,
        })?;

    tracing::info!("Logged in to {}", registry);
    Ok(())
}

/// `base64(user:password)` → `(user, password)`
fn decode_token(token: &str) -> std::result::Result<(String, String), String> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|e| format!("authorization token is not base64: {e}"))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| "authorization token is not UTF-8".to_string())?;
    let (user, password) = text
        .split_once(':')
        .ok_or_else(|| "authorization token has no user:password pair".to_string())?;
    Ok((user.to_string(), password.to_string()))
}
