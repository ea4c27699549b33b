//! Shipyard image build
//!
//! This crate turns a dockerfile and the operator's configuration into a
//! `docker build` invocation: engine capability probing, dockerfile directive
//! scanning, build argument assembly (ssh agent and secret materialization
//! included), the build itself and the final push.

pub mod args;
pub mod builder;
pub mod directives;
pub mod error;
pub mod probe;
pub mod pusher;

pub use args::{BuildArgsAssembler, BuildOptions, BuildPlan, SSH_AUTH_SOCK};
pub use builder::ImageBuilder;
pub use directives::{DockerfileDirectives, read_dockerfile};
pub use error::{BuildError, Result};
pub use probe::{Capabilities, CapabilityProbe};
pub use pusher::ImagePusher;
