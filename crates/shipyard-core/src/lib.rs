//! Shipyard core plumbing
//!
//! Subprocess execution behind the [`CommandRunner`] seam, GitHub Actions
//! workflow commands (log groups, secret masking, step outputs) and the
//! in-memory fakes the other crates test against.

pub mod error;
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;
pub mod process;
pub mod workflow;

pub use error::{CoreError, Result};
pub use process::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
pub use workflow::{ActionsMasker, LogGroup, SecretMasker, group};
