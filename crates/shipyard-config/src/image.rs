//! Image naming
//!
//! Repository path and the two tags every run produces.

use crate::context::GitHubContext;
use crate::error::{ConfigError, Result};
use crate::inputs::Inputs;

/// Where the image lives in the primary registry and what it is tagged as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Primary registry host, e.g. `acct.dkr.ecr.us-east-1.amazonaws.com`.
    pub registry: String,
    /// Repository path inside the registry, lowercase.
    pub repository: String,
    /// Commit sha used for the sha tag and the GITHUB_SHA build arg.
    pub sha: String,
    tag_prefix: String,
}

impl ImageReference {
    pub fn new(
        registry: &str,
        repository: &str,
        sha: &str,
        architecture: Option<&str>,
    ) -> Self {
        let tag_prefix = architecture
            .map(|arch| format!("{}-", arch.trim().to_lowercase()))
            .unwrap_or_default();
        Self {
            registry: registry.trim().trim_end_matches('/').to_lowercase(),
            repository: repository.to_lowercase(),
            sha: sha.trim().to_string(),
            tag_prefix,
        }
    }

    /// Derive from operator inputs and the run context.
    pub fn from_inputs(inputs: &Inputs, ctx: &GitHubContext) -> Result<Self> {
        let repository = repository_path(ctx, inputs.working_directory(), inputs.repository())?;
        Ok(Self::new(
            &inputs.ecr_uri,
            &repository,
            ctx.sha(),
            inputs.architecture(),
        ))
    }

    /// `registry/repository`, the target of `push --all-tags`.
    pub fn base(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }

    pub fn latest(&self) -> String {
        format!("{}:{}latest", self.base(), self.tag_prefix)
    }

    pub fn sha_tag(&self) -> String {
        format!("{}:{}{}", self.base(), self.tag_prefix, self.sha).to_lowercase()
    }

    /// Same repository and tags on another registry host. Mirrors never
    /// carry the architecture prefix.
    pub fn mirror_tags(&self, host: &str) -> [String; 2] {
        let base = format!("{}/{}", host.to_lowercase(), self.repository);
        [
            format!("{}:latest", base),
            format!("{}:{}", base, self.sha).to_lowercase(),
        ]
    }
}

/// `github/<owner>/<repo>/<branch>[/<working-dir>]`, or a validated override.
pub fn repository_path(
    ctx: &GitHubContext,
    working_directory: &str,
    override_path: Option<&str>,
) -> Result<String> {
    let owner_repo = ctx.owner_repo()?;
    let expected_prefix = format!("github/{}", owner_repo);

    if let Some(path) = override_path {
        let path = path.trim().trim_matches('/').to_lowercase();
        let under_prefix = path == expected_prefix
            || path
                .strip_prefix(&expected_prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        if !under_prefix {
            return Err(ConfigError::InvalidRepositoryOverride {
                repository: path,
                expected_prefix,
            });
        }
        return Ok(path);
    }

    let mut path = format!("{}/{}", expected_prefix, ctx.branch()?);
    if let Some(suffix) = working_directory_suffix(working_directory) {
        path.push('/');
        path.push_str(&suffix);
    }
    Ok(path.to_lowercase())
}

/// `services/api/` → `services-api`; `.` and `./` → none.
fn working_directory_suffix(dir: &str) -> Option<String> {
    let dir = dir.trim();
    let dir = dir.strip_prefix("./").unwrap_or(dir);
    let dir = dir.trim_matches(|c| c == '/' || c == '\\');
    if dir.is_empty() || dir == "." {
        return None;
    }
    Some(dir.replace(['/', '\\'], "-"))
}
