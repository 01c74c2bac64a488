pub mod git;
pub mod report;
pub mod scan;
pub mod settings;
pub mod styling;

pub use git::{GitError, GitRunner, SystemGit};
pub use report::{Divergence, RepoReport, collect_report};
