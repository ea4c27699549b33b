//! Dockerfile ディレクティブの検出
//!
//! Dockerfile のテキストを一度だけ読み込み、ビルド設定を左右するシグナルを
//! 抽出します。検出は純粋関数で、I/O は [`read_dockerfile`] のみが行います。

use crate::error::{BuildError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

static SSH_MOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mount=type=ssh").expect("valid regex"));

static SHA_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GITHUB_SHA").expect("valid regex"));

// 行頭（空白は許容）の RUN / COPY で、同じ行に `<<` を含むもの
static HEREDOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*(run|copy).*?<<").expect("valid regex"));

// `--mount=` のオプション列（順不同: `type=secret,id=x` も `id=x,type=secret` も可）
static MOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--mount=(\S+)").expect("valid regex"));

/// オプション列の `key=value` から値を取り出す
fn mount_option<'a>(options: &'a str, key: &str) -> Option<&'a str> {
    options
        .split(',')
        .filter_map(|option| option.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn mounts_of_type<'a>(text: &'a str, kind: &'a str) -> impl Iterator<Item = &'a str> {
    MOUNT
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(move |options| mount_option(options, "type") == Some(kind))
}

/// Dockerfile から検出したシグナル（不変のスナップショット）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockerfileDirectives {
    /// `RUN --mount=type=ssh` を要求している
    pub requests_ssh_mount: bool,
    /// `GITHUB_SHA` を参照している
    pub uses_sha_build_arg: bool,
    /// BuildKit の heredoc 構文（`RUN <<EOF` など）を使っている
    pub requests_heredoc: bool,
    secret_ids: BTreeSet<String>,
}

impl DockerfileDirectives {
    /// Dockerfile のテキストをスキャン
    pub fn scan(text: &str) -> Self {
        Self {
            requests_ssh_mount: SSH_MOUNT.is_match(text)
                || mounts_of_type(text, "ssh").next().is_some(),
            uses_sha_build_arg: SHA_TOKEN.is_match(text),
            requests_heredoc: HEREDOC.is_match(text),
            secret_ids: mounts_of_type(text, "secret")
                .filter_map(|options| mount_option(options, "id"))
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// `--mount=type=secret,id=<id>` を要求しているか
    pub fn requests_secret_mount(&self, id: &str) -> bool {
        self.secret_ids.contains(id)
    }

    pub fn secret_ids(&self) -> impl Iterator<Item = &str> {
        self.secret_ids.iter().map(String::as_str)
    }
}

/// `working_directory` からの相対パスで Dockerfile を読み込む
pub async fn read_dockerfile(working_directory: &Path, dockerfile: &str) -> Result<String> {
    let path = working_directory.join(dockerfile);
    tracing::debug!("Reading dockerfile: {}", path.display());
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| BuildError::DockerfileUnreadable { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_dockerfile() {
        assert_eq!(DockerfileDirectives::scan(""), DockerfileDirectives::default());
    }

    #[test]
    fn test_ssh_mount() {
        let d = DockerfileDirectives::scan(
            "FROM node\nRUN --mount=type=ssh git clone git@github.com:acme/lib.git\n",
        );
        assert!(d.requests_ssh_mount);
        assert!(!d.requests_heredoc);
    }

    #[test]
    fn test_sha_token() {
        let d = DockerfileDirectives::scan("ARG GITHUB_SHA\nENV VERSION=$GITHUB_SHA\n");
        assert!(d.uses_sha_build_arg);
        assert!(!DockerfileDirectives::scan("ARG VERSION\n").uses_sha_build_arg);
    }

    #[test]
    fn test_heredoc_detection() {
        let run = "FROM alpine\nRUN <<EOF\necho hi\nEOF\n";
        let indented_copy = "FROM alpine\n  copy <<EOF /etc/motd\nhello\nEOF\n";
        let not_at_line_start = "FROM alpine\nLABEL note=\"RUN <<EOF\"\n";

        assert!(DockerfileDirectives::scan(run).requests_heredoc);
        assert!(DockerfileDirectives::scan(indented_copy).requests_heredoc);
        assert!(!DockerfileDirectives::scan(not_at_line_start).requests_heredoc);
    }

    #[test]
    fn test_ssh_heredoc_combination() {
        let d = DockerfileDirectives::scan(
            "FROM alpine\nRUN --mount=type=ssh <<EOF\ngit clone git@github.com:acme/x.git\nEOF\n",
        );
        assert!(d.requests_ssh_mount);
        assert!(d.requests_heredoc);
    }

    #[test]
    fn test_secret_mounts_by_id() {
        let d = DockerfileDirectives::scan(
            "RUN --mount=type=secret,id=npmrc,target=/root/.npmrc npm ci\n\
             RUN --mount=type=secret,required=true,id=secrets cat /run/secrets/secrets\n",
        );
        assert!(d.requests_secret_mount("npmrc"));
        assert!(d.requests_secret_mount("secrets"));
        assert!(!d.requests_secret_mount("other"));
        assert_eq!(d.secret_ids().collect::<Vec<_>>(), vec!["npmrc", "secrets"]);
    }

    #[test]
    fn test_secret_mount_options_in_any_order() {
        let d = DockerfileDirectives::scan(
            "RUN --mount=id=npmrc,type=secret,target=/root/.npmrc npm ci\n\
             RUN --mount=target=/cache,type=cache npm run build\n\
             RUN --mount=required=true,id=token,type=secret cat /run/secrets/token\n",
        );
        assert!(d.requests_secret_mount("npmrc"));
        assert!(d.requests_secret_mount("token"));
        assert!(!d.requests_secret_mount("/cache"));
        assert_eq!(d.secret_ids().collect::<Vec<_>>(), vec!["npmrc", "token"]);
    }

    #[test]
    fn test_ssh_mount_options_in_any_order() {
        let d = DockerfileDirectives::scan("RUN --mount=required=true,type=ssh git fetch\n");
        assert!(d.requests_ssh_mount);
    }

    #[tokio::test]
    async fn test_read_dockerfile_relative_to_working_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/Dockerfile.prod"), "FROM scratch\n").unwrap();

        let text = read_dockerfile(&dir.path().join("api"), "Dockerfile.prod")
            .await
            .unwrap();
        assert_eq!(text, "FROM scratch\n");
    }

    #[tokio::test]
    async fn test_missing_dockerfile() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_dockerfile(dir.path(), "Dockerfile").await,
            Err(BuildError::DockerfileUnreadable { .. })
        ));
    }
}
