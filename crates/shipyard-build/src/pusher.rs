//! イメージプッシュ処理
//!
//! ビルドしたイメージの全タグをプライマリレジストリにプッシュします。

use crate::error::{BuildError, Result};
use colored::Colorize;
use shipyard_config::ImageReference;
use shipyard_container::DockerCli;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher {
    docker: DockerCli,
}

impl ImagePusher {
    pub fn new(docker: DockerCli) -> Self {
        Self { docker }
    }

    /// `docker push <base> --all-tags`
    pub async fn push(&self, image: &ImageReference) -> Result<()> {
        let base = image.base();
        println!("  → {}", base.cyan());

        match self.docker.push_all_tags(&base).await? {
            Some(0) => {
                println!("{} Pushed {}", "✓".green(), base);
                Ok(())
            }
            code => Err(BuildError::PushFailed { code }),
        }
    }
}
