use shipyard_container::ContainerError;
use shipyard_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Could not read dockerfile {path}: {source}")]
    DockerfileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "platform '{0}' requested while buildx is not enabled. Please check your configuration and try again."
    )]
    PlatformWithoutBuildx(String),

    #[error("Container engine unavailable: {0}")]
    EngineUnavailable(#[source] ContainerError),

    #[error("ssh agent setup failed: {0}")]
    SshSetup(#[from] CoreError),

    #[error("github_ssh_key is not valid base64: {0}")]
    InvalidSshKey(#[from] base64::DecodeError),

    #[error("docker build failed ({})", code_text(.code))]
    BuildFailed { code: Option<i32> },

    #[error("docker push failed ({})", code_text(.code))]
    PushFailed { code: Option<i32> },

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::DockerfileUnreadable { path, source } => {
                format!(
                    "Dockerfileを読み込めません: {} ({})\n\
                     \n\
                     解決方法:\n\
                     1. dockerfile のパスを確認してください\n\
                     2. パスは working_directory からの相対パスです",
                    path.display(),
                    source
                )
            }
            BuildError::PlatformWithoutBuildx(platform) => {
                format!(
                    "platform '{}' が指定されましたが buildx が利用できません\n\
                     \n\
                     docker buildx をセットアップするか、platform を外してください。",
                    platform
                )
            }
            BuildError::EngineUnavailable(_) => {
                format!(
                    "{}\n\
                     \n\
                     ヒント:\n  \
                     • Dockerが起動しているか確認してください\n  \
                     • docker CLI が PATH にあるか確認してください",
                    self
                )
            }
            BuildError::BuildFailed { .. } => {
                format!(
                    "{}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    self
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
