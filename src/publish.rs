use std::{ffi::OsStr, path::PathBuf, process::Output};

use tokio::process::Command;

use crate::{config::PublishConfig, Error, Result};

/// Commits and pushes regenerated feed files with the `git` CLI
#[derive(Debug, Clone)]
pub struct GitPublisher {
    config: PublishConfig,
}

impl GitPublisher {
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    /// Stage `paths` and commit them if their content changed.
    ///
    /// Returns whether a commit was made.
    pub async fn publish(&self, paths: &[PathBuf]) -> Result<bool> {
        if paths.is_empty() {
            log::info!("no feed files written, nothing to publish");
            return Ok(false);
        }
        let paths = &absolute_paths(paths)?;
        self.git(["config", "user.name", self.config.author_name.as_str()])
            .await?;
        self.git(["config", "user.email", self.config.author_email.as_str()])
            .await?;
        self.git(with_paths(["add", "--"], paths)).await?;
        if !self.has_staged_changes(paths).await? {
            log::info!("feeds unchanged, skipping commit");
            return Ok(false);
        }
        self.git(with_paths(
            ["commit", "-m", self.config.commit_message.as_str(), "--"],
            paths,
        ))
        .await?;
        if self.config.push {
            self.git(["push"]).await?;
        }
        Ok(true)
    }

    async fn has_staged_changes(&self, paths: &[PathBuf]) -> Result<bool> {
        let output = self
            .command(with_paths(["diff", "--cached", "--quiet", "--"], paths))
            .output()
            .await
            .inspect_err(|e| log::warn!("failed to run git diff: {e}"))?;
        // `--quiet` exits 1 when there are differences
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(git_error("diff --cached", &output)),
        }
    }

    async fn git<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        let name = args
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::debug!("running git {args:?}");
        let output = self
            .command(&args)
            .output()
            .await
            .inspect_err(|e| log::warn!("failed to run git {name}: {e}"))?;
        if !output.status.success() {
            let err = git_error(&name, &output);
            log::warn!("{err}");
            return Err(err);
        }
        Ok(output)
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.config.repo_dir);
        cmd
    }
}

fn with_paths<'a, const N: usize>(
    head: [&'a str; N],
    paths: &'a [PathBuf],
) -> impl Iterator<Item = &'a OsStr> {
    head.into_iter()
        .map(OsStr::new)
        .chain(paths.iter().map(|p| p.as_os_str()))
}

fn git_error(command: &str, output: &Output) -> Error {
    Error::Git {
        command: command.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Output paths are relative to the process, git runs inside `repo_dir`
fn absolute_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    Ok(paths
        .iter()
        .map(std::path::absolute)
        .collect::<std::io::Result<_>>()?)
}
