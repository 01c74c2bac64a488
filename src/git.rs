//! Git invocation and output parsing.
//!
//! All git access goes through the [`GitRunner`] capability so the pairing
//! and classification logic can be exercised against canned output in tests.
//! [`SystemGit`] is the real implementation: one blocking subprocess per
//! call, with a time limit.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

/// Time limit for a single git invocation unless overridden.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum GitError {
    /// git exited non-zero, could not be spawned, or hit the time limit.
    CommandFailed { operation: String, message: String },
    /// Command output did not have the expected shape.
    ParseError(String),
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::CommandFailed { operation, message } => {
                write!(f, "git {} failed: {}", operation, message)
            }
            GitError::ParseError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GitError {}

/// Capability to run git subcommands in a working directory and capture
/// their stdout.
pub trait GitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, GitError>;
}

/// Runs the `git` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    timeout: Duration,
}

impl SystemGit {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COMMAND_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, GitError> {
        let operation = args.first().copied().unwrap_or("git").to_string();
        let command_failed = |message: String| GitError::CommandFailed {
            operation: operation.clone(),
            message,
        };

        log::debug!("$ git {} (in {})", args.join(" "), cwd.display());

        let mut child = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_failed(e.to_string()))?;

        // Drain both pipes on threads so a chatty command can't fill a pipe
        // buffer and deadlock the timeout wait.
        let mut stdout_pipe = child.stdout.take();
        let stdout_thread = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stdout_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });
        let mut stderr_pipe = child.stderr.take();
        let stderr_thread = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(command_failed(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(command_failed(e.to_string()));
            }
        };

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        if !status.success() {
            let message = String::from_utf8_lossy(&stderr).trim_end().to_string();
            return Err(command_failed(message));
        }

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}

/// A local branch together with its remote-tracking counterpart,
/// e.g. `("main", "origin/main")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPair {
    pub local: String,
    pub remote: String,
}

/// Counts extracted from `status --porcelain` output.
///
/// Only modified (`M`) and untracked (`??`) entries are counted; other
/// status codes still make the repository dirty (dirtiness is a check on
/// the raw output) but are absent from these counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyStats {
    pub modified: usize,
    pub untracked: usize,
}

/// Repository context binding a working copy path to a runner.
pub struct Repository<'a> {
    runner: &'a dyn GitRunner,
    path: PathBuf,
}

impl<'a> Repository<'a> {
    pub fn at(runner: &'a dyn GitRunner, path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_command(&self, args: &[&str]) -> Result<String, GitError> {
        self.runner.run(args, &self.path)
    }

    /// Pair each local branch with its same-named remote-tracking branch.
    ///
    /// Remotes are searched in `git remote` enumeration order and the first
    /// match wins. Local branches with no match are omitted.
    pub fn branch_pairs(&self) -> Result<Vec<BranchPair>, GitError> {
        let branches = parse_branch_listing(&self.run_command(&["branch", "-a", "--no-color"])?);
        let remotes = parse_remote_listing(&self.run_command(&["remote"])?);
        Ok(pair_branches(&branches, &remotes))
    }

    /// Count commits reachable from `to` but not from `from`.
    pub fn count_commits(&self, from: &str, to: &str) -> Result<u32, GitError> {
        let range = format!("{}..{}", from, to);
        let stdout = self.run_command(&["rev-list", "--count", &range, "--"])?;
        parse_commit_count(&stdout)
    }

    /// Commits each side of a pair has that the other does not,
    /// as `(ahead, behind)` relative to the local branch.
    pub fn ahead_behind(&self, pair: &BranchPair) -> Result<(u32, u32), GitError> {
        let ahead = self.count_commits(&pair.remote, &pair.local)?;
        let behind = self.count_commits(&pair.local, &pair.remote)?;
        Ok((ahead, behind))
    }

    /// Refresh remote-tracking refs from every configured remote.
    pub fn fetch_all(&self) -> Result<(), GitError> {
        self.run_command(&["fetch", "--all"])?;
        Ok(())
    }

    /// Raw `status --porcelain` output. The repository is dirty iff this
    /// is non-empty.
    pub fn short_status(&self) -> Result<String, GitError> {
        self.run_command(&["status", "--porcelain"])
    }
}

/// Parse `git branch -a --no-color` output into branch names.
///
/// Strips the `* ` marker from the checked-out entry and drops symbolic
/// alias lines (`remotes/origin/HEAD -> origin/main`), detached-HEAD
/// placeholders, and blank lines.
pub(crate) fn parse_branch_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .map(|line| line.strip_prefix("* ").unwrap_or(line))
        .filter(|line| !line.is_empty() && !line.contains("->") && !line.starts_with('('))
        .map(str::to_owned)
        .collect()
}

/// Parse `git remote` output into remote names, in enumeration order.
pub(crate) fn parse_remote_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a `rev-list --count` result: exactly one non-negative integer.
pub(crate) fn parse_commit_count(output: &str) -> Result<u32, GitError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(GitError::ParseError("empty commit count".to_string()));
    }
    trimmed
        .parse()
        .map_err(|e| GitError::ParseError(format!("bad commit count {:?}: {}", trimmed, e)))
}

/// Parse `status --porcelain` output into modified/untracked counts.
pub(crate) fn parse_short_status(output: &str) -> DirtyStats {
    let mut stats = DirtyStats::default();
    for line in output.lines().map(str::trim_start) {
        if line.starts_with("??") {
            stats.untracked += 1;
        } else if line.starts_with('M') {
            stats.modified += 1;
        }
    }
    stats
}

/// Pair local branches (no `remotes/` prefix) with the first remote that
/// has a same-named tracking branch in the listing.
pub(crate) fn pair_branches(branches: &[String], remotes: &[String]) -> Vec<BranchPair> {
    let mut pairs = Vec::new();
    for local in branches.iter().filter(|b| !b.starts_with("remotes/")) {
        let matched = remotes.iter().find_map(|remote| {
            let tracking = format!("remotes/{}/{}", remote, local);
            branches
                .iter()
                .any(|b| *b == tracking)
                .then(|| format!("{}/{}", remote, local))
        });
        if let Some(remote) = matched {
            pairs.push(BranchPair {
                local: local.clone(),
                remote,
            });
        }
    }
    pairs
}
