//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use larder_core::Recipe;
use larder_core::recipe::format_duration;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
///
/// Use for results that should be available for piping, like commit URLs.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// One-line summary of a recipe: slug, title, total time and tags.
#[must_use]
pub fn recipe_line(recipe: &Recipe) -> String {
    let mut line = format!("{} {}", recipe.slug.cyan().bold(), recipe.title);

    let total = format_duration(recipe.times.total_minutes);
    if !total.is_empty() {
        line.push_str(&format!(" {}", format!("({total})").dimmed()));
    }
    if !recipe.tags.is_empty() {
        line.push_str(&format!(" {}", format!("[{}]", recipe.tags.join(", ")).yellow()));
    }
    line
}

/// A tag with its recipe count, padded for column display.
#[must_use]
pub fn tag_line(tag: &str, count: usize, width: usize) -> String {
    format!("{tag:<width$} {}", count.to_string().dimmed())
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}
