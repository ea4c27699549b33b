//! Shipyard registry access
//!
//! Makes sure the target repository exists in every registry the image is
//! published to and opens a `docker login` session for each of them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          RegistryLogins::login_to_all         │
//! │  primary ──► login                            │
//! │  mirrors ──► (parse ─► ensure ─► login) × N   │
//! └───────┬───────────────────────────┬──────────┘
//!         │                           │
//! ┌───────▼─────────┐        ┌────────▼────────┐
//! │ RegistryApi      │        │ DockerCli       │
//! │ (EcrApi / fakes) │        │ (docker login)  │
//! └─────────────────┘        └─────────────────┘
//! ```

pub mod api;
pub mod credential;
pub mod ecr;
pub mod error;
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;
pub mod login;
pub mod mirror;
pub mod provision;

pub use api::{ApiError, RegistryApi, RegistryClientFactory};
pub use credential::RegistryCredential;
pub use ecr::{EcrApi, EcrClientFactory, region_from_host};
pub use error::{RegistryError, Result};
pub use login::login;
pub use mirror::{MirrorDeclaration, RegistryLogins, split_declarations};
pub use provision::{Provisioned, REPOSITORY_POLICY, ensure_repository};
