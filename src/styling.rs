//! Style constants for report output.
//!
//! Rendered through `anstream`, so escape codes are stripped automatically
//! when stdout is not a terminal.

use anstyle::{AnsiColor, Color, Style};

/// Repository header (`[name]`).
pub const REPO: Style = Style::new().bold();

/// The `dirty:` section label.
pub const DIRTY: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Branch names in out-of-sync lines.
pub const BRANCH: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
