//! コンテナエンジンの機能確認
//!
//! `docker version` / `docker buildx version` / `docker info` を実行し、
//! buildx が利用可能かどうかを判定します。

use crate::error::{BuildError, Result};
use shipyard_container::DockerCli;
use shipyard_core::{group, workflow};

/// エンジンの機能
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// buildx（マルチプラットフォームビルド）が利用可能か
    pub buildx: bool,
}

impl Capabilities {
    /// platform 指定が可能かを確認（ビルド引数の組み立て前に呼ぶ）
    pub fn check_platform(&self, platform: Option<&str>) -> Result<()> {
        match platform {
            Some(p) if !self.buildx => Err(BuildError::PlatformWithoutBuildx(p.to_string())),
            _ => Ok(()),
        }
    }
}

pub struct CapabilityProbe {
    docker: DockerCli,
}

impl CapabilityProbe {
    pub fn new(docker: DockerCli) -> Self {
        Self { docker }
    }

    /// 各コマンドをロググループ内で実行し、出力を表示
    ///
    /// `version` / `info` の失敗は致命的。buildx の失敗はログに残すだけ。
    pub async fn probe(&self) -> Result<Capabilities> {
        {
            let _group = group("docker version");
            let version = self
                .docker
                .version()
                .await
                .map_err(BuildError::EngineUnavailable)?;
            println!("{}", version);
        }

        let buildx = {
            let _group = group("docker buildx version");
            match self.docker.buildx_version().await {
                Ok(version) => {
                    println!("{}", version);
                    if let Err(e) = workflow::set_output("buildx", "enabled") {
                        tracing::warn!("Could not set buildx output: {}", e);
                    }
                    true
                }
                Err(e) => {
                    println!("buildx unavailable - {}", e);
                    false
                }
            }
        };

        {
            let _group = group("docker info");
            let info = self
                .docker
                .info()
                .await
                .map_err(BuildError::EngineUnavailable)?;
            println!("{}", info);
        }

        tracing::debug!("buildx available: {}", buildx);
        Ok(Capabilities { buildx })
    }
}
