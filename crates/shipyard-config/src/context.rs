//! GitHub run context
//!
//! Read from the variables every Actions runner exports. Flags exist so the
//! binary can be driven outside a runner, but are hidden from `--help`.

use crate::error::{ConfigError, Result};
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct GitHubContext {
    /// owner/name of the repository being built
    #[arg(
        id = "github_repository",
        long = "github-repository",
        env = "GITHUB_REPOSITORY",
        hide = true
    )]
    pub repository: String,

    /// Fully qualified ref (refs/heads/main)
    #[arg(long = "github-ref", env = "GITHUB_REF", hide = true)]
    pub git_ref: String,

    /// Commit sha being built
    #[arg(long = "github-sha", env = "GITHUB_SHA", hide = true)]
    pub sha: String,
}

impl GitHubContext {
    pub fn new(
        repository: impl Into<String>,
        git_ref: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            git_ref: git_ref.into(),
            sha: sha.into(),
        }
    }

    /// `owner/name`, lowercased.
    pub fn owner_repo(&self) -> Result<String> {
        let repo = self.repository.trim();
        match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(repo.to_lowercase())
            }
            _ => Err(ConfigError::InvalidRepository(self.repository.clone())),
        }
    }

    /// Repository name without the owner, as registered with the registry team.
    pub fn repo_name(&self) -> &str {
        self.repository
            .trim()
            .rsplit_once('/')
            .map_or(self.repository.trim(), |(_, name)| name)
    }

    /// Branch for `refs/heads/<branch>`; for any other `refs/<kind>/<name>`
    /// the name after the kind (tags, pull request merges).
    pub fn branch(&self) -> Result<&str> {
        let git_ref = self.git_ref.trim();
        if let Some(branch) = git_ref.strip_prefix("refs/heads/") {
            return non_empty(branch, git_ref);
        }
        match git_ref
            .strip_prefix("refs/")
            .and_then(|rest| rest.split_once('/'))
        {
            Some((_, name)) => non_empty(name, git_ref),
            None => Err(ConfigError::InvalidRef(self.git_ref.clone())),
        }
    }

    pub fn sha(&self) -> &str {
        self.sha.trim()
    }
}

fn non_empty<'a>(name: &'a str, git_ref: &str) -> Result<&'a str> {
    if name.is_empty() {
        Err(ConfigError::InvalidRef(git_ref.to_string()))
    } else {
        Ok(name)
    }
}
