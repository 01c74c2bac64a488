//! Divergence classification, per-repository aggregation, and rendering.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::git::{DirtyStats, GitError, GitRunner, Repository, parse_short_status};
use crate::scan;
use crate::settings::{FetchFailure, Settings};
use crate::styling::{BRANCH, DIRTY, REPO};

/// How a local branch relates to its remote-tracking branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    UpToDate,
    Ahead,
    Behind,
    Diverged,
}

impl Divergence {
    /// Classify from the commit counts each side has that the other does not.
    pub fn classify(ahead: u32, behind: u32) -> Self {
        match (ahead, behind) {
            (0, 0) => Divergence::UpToDate,
            (_, 0) => Divergence::Ahead,
            (0, _) => Divergence::Behind,
            _ => Divergence::Diverged,
        }
    }
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Divergence::UpToDate => "up to date",
            Divergence::Ahead => "ahead",
            Divergence::Behind => "behind",
            Divergence::Diverged => "diverged",
        };
        f.write_str(s)
    }
}

/// Everything worth saying about one repository.
#[derive(Debug)]
pub struct RepoReport {
    pub path: PathBuf,
    /// True iff the short-status output was non-empty. Independent of the
    /// refined counts in `stats`, which only cover modified/untracked.
    pub dirty: bool,
    pub stats: DirtyStats,
    /// Branches whose divergence is anything but up-to-date, in pairing order.
    pub out_of_sync: Vec<(String, Divergence)>,
}

impl RepoReport {
    pub fn needs_attention(&self) -> bool {
        self.dirty || !self.out_of_sync.is_empty()
    }
}

/// Collect the report for a single repository.
///
/// The remote refresh happens first so divergence reflects the latest known
/// remote state; its failure handling follows `settings.fetch_failure`.
/// Pairing or per-pair classification failures drop only the affected
/// divergence entries. Dirtiness is computed independently, so a repository
/// with broken remotes still reports its uncommitted changes.
pub fn collect_report(
    runner: &dyn GitRunner,
    path: &Path,
    settings: &Settings,
) -> Result<RepoReport, GitError> {
    let repo = Repository::at(runner, path);

    let mut skip_divergence = false;
    if settings.fetch {
        if let Err(err) = repo.fetch_all() {
            match settings.fetch_failure {
                FetchFailure::Stale => {
                    log::warn!(
                        "{}: fetch failed, divergence may be stale: {}",
                        path.display(),
                        err
                    );
                }
                FetchFailure::Skip => {
                    log::warn!(
                        "{}: fetch failed, skipping divergence: {}",
                        path.display(),
                        err
                    );
                    skip_divergence = true;
                }
            }
        }
    }

    let mut out_of_sync = Vec::new();
    if !skip_divergence {
        match repo.branch_pairs() {
            Ok(pairs) => {
                for pair in pairs {
                    match repo.ahead_behind(&pair) {
                        Ok((ahead, behind)) => {
                            let status = Divergence::classify(ahead, behind);
                            if status != Divergence::UpToDate {
                                out_of_sync.push((pair.local, status));
                            }
                        }
                        Err(err) => {
                            log::warn!("{}: skipping {}: {}", path.display(), pair.local, err);
                        }
                    }
                }
            }
            Err(err) => {
                log::warn!("{}: cannot pair branches: {}", path.display(), err);
            }
        }
    }

    let status_output = repo.short_status()?;
    let dirty = !status_output.is_empty();
    let stats = parse_short_status(&status_output);

    Ok(RepoReport {
        path: path.to_path_buf(),
        dirty,
        stats,
        out_of_sync,
    })
}

/// Render a report as the text block printed for one repository.
///
/// Dirty count lines are suppressed when zero; the trailing blank line
/// separates repositories.
pub fn render(report: &RepoReport) -> String {
    let name = report
        .path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| report.path.to_string_lossy());

    let mut out = String::new();
    let _ = writeln!(out, "{REPO}[{name}]{REPO:#}");
    if report.dirty {
        let _ = writeln!(out, "{DIRTY}dirty:{DIRTY:#}");
        if report.stats.modified > 0 {
            let _ = writeln!(out, "\t{} modified", report.stats.modified);
        }
        if report.stats.untracked > 0 {
            let _ = writeln!(out, "\t{} untracked", report.stats.untracked);
        }
    }
    if !report.out_of_sync.is_empty() {
        let _ = writeln!(out, "out of sync:");
        for (branch, status) in &report.out_of_sync {
            let _ = writeln!(out, "\t{BRANCH}{branch}{BRANCH:#} is {status}");
        }
    }
    out.push('\n');
    out
}

/// Scan the configured root and print a report for every repository that is
/// dirty or out of sync. Per-repository failures are logged and do not stop
/// the scan.
pub fn run(runner: &dyn GitRunner, settings: &Settings) -> anyhow::Result<()> {
    for path in scan::find_repositories(&settings.root) {
        match collect_report(runner, &path, settings) {
            Ok(report) if report.needs_attention() => {
                anstream::print!("{}", render(&report));
            }
            Ok(_) => {}
            Err(err) => log::error!("{}: {}", path.display(), err),
        }
    }
    Ok(())
}
