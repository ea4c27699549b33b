use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("docker command failed: {0}")]
    Process(#[from] shipyard_core::CoreError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ContainerError>;
