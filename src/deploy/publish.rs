//! Commit generated deployment files and force-push the deploy branches

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::mode::DeployMode;
use crate::config::DeployConfig;
use crate::errors::{LimsError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    pub args: Vec<String>,
}

impl GitCommand {
    fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn run(&self, repo: &Path) -> Result<std::process::Output> {
        debug!("Running {}", self);
        Command::new("git")
            .args(&self.args)
            .current_dir(repo)
            .output()
            .map_err(|e| LimsError::git(format!("Failed to run {}: {}", self, e)))
    }

    fn run_checked(&self, repo: &Path) -> Result<()> {
        let output = self.run(repo)?;
        if output.status.success() {
            return Ok(());
        }
        Err(LimsError::git(format!(
            "{} failed ({}): {}",
            self,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.args.join(" "))
    }
}

/// Git steps of one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub mode: DeployMode,
    pub files: Vec<String>,
    pub commit_message: String,
    pub remote: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub committed: bool,
    pub pushed: Vec<String>,
}

impl PublishPlan {
    /// Stages the generated files and every file the manifest lists
    pub fn new(mode: DeployMode, config: &DeployConfig) -> Self {
        let mut files: Vec<String> = Vec::new();
        let listed = [&config.manifest_path, &config.lock_output]
            .into_iter()
            .chain(&config.files);
        for file in listed {
            let file = file.replace('\\', "/");
            if !files.contains(&file) {
                files.push(file);
            }
        }
        Self {
            mode,
            files,
            commit_message: config.commit_message.clone(),
            remote: config.remote.clone(),
        }
    }

    /// `--force` stages listed files even when they are ignored
    pub fn add_command(&self) -> GitCommand {
        GitCommand::new(
            ["add", "--force", "--"]
                .into_iter()
                .map(String::from)
                .chain(self.files.iter().cloned()),
        )
    }

    pub fn commit_command(&self) -> GitCommand {
        GitCommand::new(["commit", "-m", self.commit_message.as_str()])
    }

    pub fn push_commands(&self) -> Vec<GitCommand> {
        self.mode
            .branches()
            .iter()
            .map(|branch| {
                GitCommand::new([
                    "push".to_string(),
                    "--force".to_string(),
                    self.remote.clone(),
                    format!("HEAD:refs/heads/{}", branch),
                ])
            })
            .collect()
    }

    /// Every command in execution order
    pub fn commands(&self) -> Vec<GitCommand> {
        let mut commands = vec![self.add_command(), self.commit_command()];
        commands.extend(self.push_commands());
        commands
    }

    /// Run the plan in `repo`; the commit is skipped when nothing is staged
    pub fn execute(&self, repo: impl Into<PathBuf>) -> Result<PublishReport> {
        let repo = repo.into();
        let mut report = PublishReport::default();

        self.add_command().run_checked(&repo)?;

        let staged = GitCommand::new(["diff", "--cached", "--quiet"]).run(&repo)?;
        match staged.status.code() {
            Some(0) => info!("No changes to deployment files, skipping commit"),
            Some(1) => {
                self.commit_command().run_checked(&repo)?;
                report.committed = true;
            }
            _ => {
                return Err(LimsError::git(format!(
                    "git diff --cached failed: {}",
                    String::from_utf8_lossy(&staged.stderr).trim()
                )));
            }
        }

        for (push, branch) in self.push_commands().iter().zip(self.mode.branches()) {
            push.run_checked(&repo)?;
            info!("Force-pushed {} to {}", self.remote, branch);
            report.pushed.push(branch.to_string());
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_mode_pushes_test_then_prod() {
        let plan = PublishPlan::new(DeployMode::Both, &DeployConfig::default());
        let commands: Vec<String> = plan.commands().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            commands,
            vec![
                "git add --force -- manifest.json dependencies.txt Cargo.toml Cargo.lock assets/styles.css assets/brand.yml",
                "git commit -m Update deployment manifest",
                "git push --force origin HEAD:refs/heads/test_deploy",
                "git push --force origin HEAD:refs/heads/deploy",
            ]
        );
    }

    #[test]
    fn prod_mode_pushes_only_deploy() {
        let plan = PublishPlan::new(DeployMode::Prod, &DeployConfig::default());
        let pushes = plan.push_commands();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].args.last().unwrap(), "HEAD:refs/heads/deploy");
    }
}
