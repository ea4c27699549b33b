//! イメージビルド
//!
//! 組み立て済みの [`BuildPlan`] で `docker build` を実行し、出力をそのまま流します。

use crate::args::BuildPlan;
use crate::error::{BuildError, Result};
use colored::Colorize;
use shipyard_container::DockerCli;
use shipyard_core::group;
use std::path::Path;

pub struct ImageBuilder {
    docker: DockerCli,
}

impl ImageBuilder {
    pub fn new(docker: DockerCli) -> Self {
        Self { docker }
    }

    /// イメージをビルド
    ///
    /// 失敗時はリトライせず、エンジンの終了コードを [`BuildError::BuildFailed`] で返す。
    pub async fn build(&self, plan: &BuildPlan, working_directory: &Path) -> Result<()> {
        let _group = group("Docker Build");
        tracing::info!("Building image in {}", working_directory.display());
        tracing::debug!("Build args: {:?}", plan.args());

        let code = self
            .docker
            .build(plan.args(), &plan.env_pairs(), working_directory)
            .await?;

        match code {
            Some(0) => {
                println!("{} Build complete", "✓".green());
                Ok(())
            }
            code => Err(BuildError::BuildFailed { code }),
        }
    }
}
