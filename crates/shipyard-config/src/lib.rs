pub mod context;
pub mod error;
pub mod image;
pub mod inputs;

pub use context::GitHubContext;
pub use error::{ConfigError, Result};
pub use image::ImageReference;
pub use inputs::{DEFAULT_DOCKERFILE, Inputs, parse_bool};
