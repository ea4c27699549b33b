use shipyard_build::BuildError;
use shipyard_config::ConfigError;
use shipyard_container::{ContainerError, VerificationOutcome};
use shipyard_registry::RegistryError;
use thiserror::Error;

/// Terminal failure of a pipeline run. [`PipelineError::exit_code`] is the
/// only place failures are turned into process exit codes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("{source}{}", reregister_hint(.repo_name))]
    Provisioning {
        #[source]
        source: RegistryError,
        repo_name: String,
    },

    #[error(transparent)]
    Authentication(RegistryError),

    #[error("{stage} {outcome}")]
    Verification {
        stage: &'static str,
        outcome: VerificationOutcome,
    },

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn reregister_hint(repo_name: &str) -> String {
    format!(
        "\n\n  Please re-register this github repository to get updated credentials:\n\n  glgroup ecr register-github-repo -r {}\n",
        repo_name
    )
}

impl PipelineError {
    /// Sort a registry failure into authentication or provisioning.
    pub fn registry(source: RegistryError, repo_name: &str) -> Self {
        if source.is_authentication() {
            PipelineError::Authentication(source)
        } else {
            PipelineError::Provisioning {
                source,
                repo_name: repo_name.to_string(),
            }
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Build(BuildError::DockerfileUnreadable { .. }) => 2,
            PipelineError::Build(BuildError::PlatformWithoutBuildx(_)) => 3,
            PipelineError::Build(
                BuildError::BuildFailed { code } | BuildError::PushFailed { code },
            ) => engine_code(*code),
            PipelineError::Authentication(_) => 4,
            _ => 1,
        }
    }

    /// Message for the terminal, with hints where there are any.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Build(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// The engine's own exit status, falling back to 1 when it has none that
/// fits a process exit code.
fn engine_code(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_registry::ApiError;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_exit_codes() {
        let unreadable = PipelineError::Build(BuildError::DockerfileUnreadable {
            path: PathBuf::from("Dockerfile"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        assert_eq!(unreadable.exit_code(), 2);

        let platform = PipelineError::Build(BuildError::PlatformWithoutBuildx("arm64".into()));
        assert_eq!(platform.exit_code(), 3);

        let auth = PipelineError::registry(
            RegistryError::AuthenticationFailed {
                registry: "host".into(),
                reason: "denied".into(),
            },
            "widget",
        );
        assert_eq!(auth.exit_code(), 4);

        let timed_out = PipelineError::Verification {
            stage: "Unit test",
            outcome: VerificationOutcome::TimedOut {
                after: Duration::from_secs(1800),
            },
        };
        assert_eq!(timed_out.exit_code(), 1);

        let config = PipelineError::Config(ConfigError::MissingInput("ecr_uri"));
        assert_eq!(config.exit_code(), 1);
    }

    #[test]
    fn test_engine_exit_code_is_surfaced() {
        assert_eq!(
            PipelineError::Build(BuildError::BuildFailed { code: Some(17) }).exit_code(),
            17
        );
        assert_eq!(
            PipelineError::Build(BuildError::PushFailed { code: None }).exit_code(),
            1
        );
        assert_eq!(
            PipelineError::Build(BuildError::BuildFailed { code: Some(-1) }).exit_code(),
            1
        );
    }

    #[test]
    fn test_provisioning_error_carries_hint() {
        let err = PipelineError::registry(
            RegistryError::CouldNotSetPolicy {
                repository: "github/acme/widget/main".into(),
                source: ApiError::Service("AccessDenied".into()),
            },
            "widget",
        );
        assert_eq!(err.exit_code(), 1);
        let message = err.to_string();
        assert!(message.starts_with("Could not set ECR policy for github/acme/widget/main"));
        assert!(message.contains("glgroup ecr register-github-repo -r widget"));
    }
}
