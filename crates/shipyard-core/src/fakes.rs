//! In-memory fakes for the process and masking seams (testing only)
//!
//! `FakeRunner` answers invocations from scripted rules and records every
//! call; `RecordingMasker` records masked secrets together with how many
//! commands had run at that point, so tests can assert ordering.

use crate::error::{CoreError, Result};
use crate::process::{CommandOutput, CommandRunner, Invocation};
use crate::workflow::SecretMasker;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Response {
    Output(CommandOutput),
    Delayed(Duration, CommandOutput),
    SpawnError,
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: Vec<String>,
    response: Response,
}

/// Scripted [`CommandRunner`].
///
/// Rules match on a prefix of the command line (program included); the most
/// recently added matching rule wins. Unmatched invocations succeed with
/// stdout `"ok"`.
#[derive(Debug, Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations starting with `prefix` with `output`.
    pub fn on(&self, prefix: &[&str], output: CommandOutput) -> &Self {
        self.push(prefix, Response::Output(output))
    }

    /// Answer after `delay` (observes tokio's clock, so paused time works).
    pub fn on_delayed(&self, prefix: &[&str], delay: Duration, output: CommandOutput) -> &Self {
        self.push(prefix, Response::Delayed(delay, output))
    }

    /// Make invocations starting with `prefix` fail to spawn.
    pub fn fail_spawn(&self, prefix: &[&str]) -> &Self {
        self.push(prefix, Response::SpawnError)
    }

    /// All invocations seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Invocations whose command line starts with `prefix`.
    pub fn calls_to(&self, prefix: &[&str]) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Position of the first invocation starting with `prefix`.
    pub fn position(&self, prefix: &[&str]) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }

    fn push(&self, prefix: &[&str], response: Response) -> &Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
        });
        self
    }

    async fn respond(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());

        let response = {
            let rules = self.rules.lock().unwrap();
            rules
                .iter()
                .rev()
                .find(|r| {
                    let prefix: Vec<&str> = r.prefix.iter().map(String::as_str).collect();
                    invocation.starts_with(&prefix)
                })
                .map(|r| r.response.clone())
        };

        match response {
            None => Ok(CommandOutput::ok("ok")),
            Some(Response::Output(output)) => Ok(output),
            Some(Response::Delayed(delay, output)) => {
                tokio::time::sleep(delay).await;
                Ok(output)
            }
            Some(Response::SpawnError) => Err(CoreError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
            }),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.respond(invocation).await
    }

    async fn stream(&self, invocation: &Invocation) -> Result<Option<i32>> {
        Ok(self.respond(invocation).await?.code)
    }
}

/// Records masked secrets.
#[derive(Debug, Default)]
pub struct RecordingMasker {
    runner: Option<Arc<FakeRunner>>,
    masked: Mutex<Vec<(String, usize)>>,
}

impl RecordingMasker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also note how many commands `runner` had seen at each mask call.
    pub fn observing(runner: Arc<FakeRunner>) -> Self {
        Self {
            runner: Some(runner),
            masked: Mutex::new(Vec::new()),
        }
    }

    pub fn secrets(&self) -> Vec<String> {
        self.masked
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }

    /// Number of commands that had run when `secret` was first masked.
    pub fn masked_after(&self, secret: &str) -> Option<usize> {
        self.masked
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == secret)
            .map(|(_, n)| *n)
    }
}

impl SecretMasker for RecordingMasker {
    fn mask(&self, secret: &str) {
        let seen = self.runner.as_ref().map_or(0, |r| r.calls().len());
        self.masked
            .lock()
            .unwrap()
            .push((secret.to_string(), seen));
    }
}
