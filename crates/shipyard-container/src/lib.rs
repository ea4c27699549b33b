//! Container engine integration
//!
//! docker CLI wrapper plus the two verification supervisors that run the
//! built image: a unit test with a hard timeout and an HTTP healthcheck with
//! bounded retries.

pub mod docker;
pub mod error;
pub mod healthcheck;
pub mod tokenize;

pub use docker::{DockerCli, TEST_CONTAINER};
pub use error::{ContainerError, Result};
pub use healthcheck::{HealthProbe, HealthcheckSupervisor, HttpProbe};
pub use tokenize::tokenize_command;
pub use unit_test::{UNIT_TEST_TIMEOUT, UnitTestSupervisor};

use std::fmt;
use std::time::Duration;

/// Result of a verification supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Passed,
    /// The unit test finished but its output or exit status failed it.
    Failed { reason: String },
    /// Every healthcheck attempt failed.
    FailedRetriesExhausted { attempts: u32 },
    TimedOut { after: Duration },
}

impl VerificationOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, VerificationOutcome::Passed)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationOutcome::Passed => write!(f, "passed"),
            VerificationOutcome::Failed { reason } => write!(f, "failed: {}", reason),
            VerificationOutcome::FailedRetriesExhausted { attempts } => {
                write!(f, "failed after {} attempts", attempts)
            }
            VerificationOutcome::TimedOut { after } => {
                write!(f, "timed out after {} minutes", after.as_secs() / 60)
            }
        }
    }
}
