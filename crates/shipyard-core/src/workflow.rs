//! GitHub Actions workflow commands
//!
//! Log groups, secret masking and step outputs. Outside of a runner these
//! degrade to plain stdout lines, which is harmless.

use crate::error::Result;
use std::io::Write;

/// A collapsible log section. `::endgroup::` is emitted on drop, so a group
/// is closed on every exit path out of the scope that opened it.
#[must_use = "the group closes as soon as the guard is dropped"]
pub struct LogGroup {
    name: String,
}

impl LogGroup {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        println!("::endgroup::");
    }
}

/// Open a log group named `name`.
pub fn group(name: &str) -> LogGroup {
    println!("::group::{}", escape_data(name));
    LogGroup {
        name: name.to_string(),
    }
}

/// Registers values that must be redacted from all subsequent log output.
pub trait SecretMasker: Send + Sync {
    fn mask(&self, secret: &str);
}

/// Masks through the runner's `::add-mask::` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionsMasker;

impl SecretMasker for ActionsMasker {
    fn mask(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }
        println!("::add-mask::{}", escape_data(secret));
    }
}

/// Emit an error annotation.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Emit a warning annotation.
pub fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

/// Append `name=value` to the step output file named by `GITHUB_OUTPUT`.
///
/// Without a runner the output is only logged.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) else {
        tracing::debug!("GITHUB_OUTPUT not set, skipping output {}={}", name, value);
        return Ok(());
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}={}", name, value)?;
    Ok(())
}

/// Escape `%`, CR and LF as the workflow command parser expects.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
