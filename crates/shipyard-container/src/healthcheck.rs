//! Healthcheck supervisor
//!
//! Starts the image detached on the host network and polls its healthcheck
//! endpoint a bounded number of times with a fixed pause between attempts.

use crate::VerificationOutcome;
use crate::docker::{DockerCli, TEST_CONTAINER};
use crate::error::Result;
use async_trait::async_trait;
use colored::Colorize;
use shipyard_core::workflow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Attempts before the healthcheck is considered failed.
pub const MAX_ATTEMPTS: u32 = 5;

/// Pause between two failed attempts.
pub const ATTEMPT_INTERVAL: Duration = Duration::from_secs(5);

const NO_HEALTHCHECK_HINT: &str = "If your container does not require a healthcheck (most jobs don't), then set healthcheck to a blank string.";

/// A single healthcheck request.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// GET `url`. `Ok` carries the status of a healthy response; any
    /// transport error or a status >= 400 is an `Err` describing why.
    async fn get(&self, url: &str) -> std::result::Result<u16, String>;
}

/// [`HealthProbe`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn get(&self, url: &str) -> std::result::Result<u16, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(format!("status {}", status));
        }
        Ok(status.as_u16())
    }
}

pub struct HealthcheckSupervisor {
    docker: DockerCli,
    probe: Arc<dyn HealthProbe>,
    max_attempts: u32,
    interval: Duration,
}

impl HealthcheckSupervisor {
    pub fn new(docker: DockerCli, probe: Arc<dyn HealthProbe>) -> Self {
        Self {
            docker,
            probe,
            max_attempts: MAX_ATTEMPTS,
            interval: ATTEMPT_INTERVAL,
        }
    }

    /// Arguments after `docker run`.
    pub fn run_args(image: &str, path: &str, port: u16, env_file: Option<&str>) -> Vec<String> {
        let mut args: Vec<String> = [
            "--detach".to_string(),
            "--net".to_string(),
            "host".to_string(),
            "--publish".to_string(),
            format!("{port}:{port}"),
            "--env".to_string(),
            format!("HEALTHCHECK={path}"),
            "--env".to_string(),
            format!("PORT={port}"),
            "--name".to_string(),
            TEST_CONTAINER.to_string(),
        ]
        .into();
        if let Some(file) = env_file {
            args.push("--env-file".to_string());
            args.push(file.to_string());
        }
        args.push(image.to_string());
        args
    }

    pub fn url(path: &str, port: u16) -> String {
        format!("http://localhost:{}{}", port, path)
    }

    /// Start `image` and poll `http://localhost:<port><path>`.
    pub async fn run(
        &self,
        image: &str,
        path: &str,
        port: u16,
        env_file: Option<&str>,
    ) -> Result<VerificationOutcome> {
        let args = Self::run_args(image, path, port, env_file);
        let started = self.docker.run(&args).await?;
        println!("{}", started.stdout.trim());

        if !started.success() {
            let outcome = VerificationOutcome::Failed {
                reason: format!(
                    "container did not start ({}): {}",
                    started.code_display(),
                    started.stderr.trim()
                ),
            };
            workflow::error(&format!("Healthcheck {}", outcome));
            self.cleanup().await;
            return Ok(outcome);
        }

        let url = Self::url(path, port);
        let outcome = self.poll(&url).await;

        match &outcome {
            VerificationOutcome::Passed => {
                println!("{} Healthcheck Passed!", "✓".green());
                self.docker.stop_and_remove(TEST_CONTAINER).await;
            }
            _ => {
                workflow::error(&format!(
                    "Container did not pass healthcheck at {} after {} attempts",
                    url, self.max_attempts
                ));
                workflow::warning(NO_HEALTHCHECK_HINT);
                self.docker.dump_logs(TEST_CONTAINER).await;
                self.docker.stop_and_remove(TEST_CONTAINER).await;
            }
        }
        Ok(outcome)
    }

    async fn poll(&self, url: &str) -> VerificationOutcome {
        for attempt in 0..self.max_attempts {
            match self.probe.get(url).await {
                Ok(status) => {
                    tracing::debug!("Healthcheck {} answered {}", url, status);
                    return VerificationOutcome::Passed;
                }
                Err(reason) => {
                    println!(
                        "Tested Healthcheck {} : Attempt {} of {}",
                        url,
                        attempt + 1,
                        self.max_attempts
                    );
                    tracing::debug!("Healthcheck attempt failed: {}", reason);
                }
            }

            // 最後の試行でなければ待機
            if attempt + 1 < self.max_attempts {
                sleep(self.interval).await;
            }
        }

        VerificationOutcome::FailedRetriesExhausted {
            attempts: self.max_attempts,
        }
    }

    async fn cleanup(&self) {
        if let Err(e) = self.docker.remove(TEST_CONTAINER).await {
            tracing::debug!("Could not remove {}: {}", TEST_CONTAINER, e);
        }
    }
}
