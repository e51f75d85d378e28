//! Build log output helpers
//!
//! The build log is plain line-oriented output: topic lines for each
//! stage, indented detail lines for everything a tool prints underneath.

use console::style;

/// Indentation applied to detail lines under a topic.
pub const INDENT: &str = "      ";

/// Announce a build stage.
pub fn topic(message: &str) {
    println!("{} {}", style("----->").cyan().bold(), message);
}

/// Print a detail line under the current topic.
pub fn detail(message: &str) {
    println!("{INDENT}{message}");
}

/// Print a non-fatal warning under the current topic.
pub fn warn(message: &str) {
    println!("{INDENT}{} {}", style("WARNING:").yellow().bold(), message);
}
