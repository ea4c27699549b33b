//! docker CLI wrapper
//!
//! Wraps the docker CLI commands the pipeline needs. `docker login` stores
//! credentials in the CLI config that later `build` and `push` calls read.

use crate::error::Result;
use shipyard_core::{CommandOutput, CommandRunner, Invocation, group};
use std::path::Path;
use std::sync::Arc;

/// Name of the ephemeral container both verification supervisors start.
pub const TEST_CONTAINER: &str = "test-container";

/// docker CLI wrapper
#[derive(Clone)]
pub struct DockerCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl DockerCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            program: "docker".to_string(),
        }
    }

    fn command<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(&self.program).args(args)
    }

    /// `docker version`
    pub async fn version(&self) -> Result<String> {
        Ok(self.runner.run(&self.command(["version"])).await?)
    }

    /// `docker buildx version`
    pub async fn buildx_version(&self) -> Result<String> {
        Ok(self.runner.run(&self.command(["buildx", "version"])).await?)
    }

    /// `docker info`
    pub async fn info(&self) -> Result<String> {
        Ok(self.runner.run(&self.command(["info"])).await?)
    }

    /// `docker build <args> .` inside `workdir`, output streamed live.
    ///
    /// Returns the exit code (`None` when killed by a signal).
    pub async fn build(
        &self,
        args: &[String],
        env: &[(String, String)],
        workdir: &Path,
    ) -> Result<Option<i32>> {
        let invocation = self
            .command(["build"])
            .args(args.iter().cloned())
            .arg(".")
            .envs(env.iter().cloned())
            .current_dir(workdir);
        Ok(self.runner.stream(&invocation).await?)
    }

    /// `docker run <args>`, captured. The exit status is left to the caller.
    pub async fn run(&self, args: &[String]) -> Result<CommandOutput> {
        let invocation = self.command(["run"]).args(args.iter().cloned());
        Ok(self.runner.output(&invocation).await?)
    }

    /// `docker logs <container>`
    pub async fn logs(&self, container: &str) -> Result<CommandOutput> {
        Ok(self.runner.output(&self.command(["logs", container])).await?)
    }

    /// `docker stop <container>`
    pub async fn stop(&self, container: &str) -> Result<String> {
        Ok(self.runner.run(&self.command(["stop", container])).await?)
    }

    /// `docker rm --force <container>`
    pub async fn remove(&self, container: &str) -> Result<()> {
        self.runner
            .run(&self.command(["rm", "--force", container]))
            .await?;
        Ok(())
    }

    /// `docker push <base> --all-tags`, output streamed live.
    pub async fn push_all_tags(&self, base: &str) -> Result<Option<i32>> {
        Ok(self
            .runner
            .stream(&self.command(["push", base, "--all-tags"]))
            .await?)
    }

    /// `docker login --username <u> --password <p> <registry>`
    ///
    /// The password must already be masked by the caller.
    pub async fn login(&self, username: &str, password: &str, registry: &str) -> Result<()> {
        self.runner
            .run(&self.command([
                "login",
                "--username",
                username,
                "--password",
                password,
                registry,
            ]))
            .await?;
        Ok(())
    }

    /// `docker logout <registry>`
    pub async fn logout(&self, registry: &str) -> Result<()> {
        self.runner.run(&self.command(["logout", registry])).await?;
        Ok(())
    }

    /// Print a container's logs inside a log group. Failures are only logged;
    /// this runs on paths that are already failing.
    pub async fn dump_logs(&self, container: &str) {
        let _group = group("docker logs");
        match self.logs(container).await {
            Ok(output) => {
                println!("{}", output.stdout);
                println!("{}", output.stderr);
            }
            Err(e) => tracing::warn!("Could not read logs of {}: {}", container, e),
        }
    }

    /// Stop then remove a container, logging rather than failing.
    pub async fn stop_and_remove(&self, container: &str) {
        match self.stop(container).await {
            Ok(stdout) => println!("{} stopped.", stdout.trim()),
            Err(e) => tracing::warn!("Could not stop {}: {}", container, e),
        }
        if let Err(e) = self.remove(container).await {
            tracing::debug!("Could not remove {}: {}", container, e);
        }
    }
}
