use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::types::Theme;

/// Global output settings
static OUTPUT_FORMAT: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);
static DARK: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    let value = match format {
        OutputFormat::Table => 0,
        OutputFormat::Json => 1,
        OutputFormat::Compact => 2,
    };
    OUTPUT_FORMAT.store(value, Ordering::Relaxed);
}

pub fn format() -> OutputFormat {
    match OUTPUT_FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        2 => OutputFormat::Compact,
        _ => OutputFormat::Table,
    }
}

pub fn is_json_output() -> bool {
    matches!(format(), OutputFormat::Json)
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn set_theme(theme: Theme) {
    DARK.store(theme.is_dark(), Ordering::Relaxed);
}

/// Print a table, compact lines or JSON depending on output mode
pub fn print_table<T, R, F, C>(items: &[T], to_row: F, to_line: C)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
    C: Fn(&T) -> String,
{
    match format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Compact => {
            for item in items {
                println!("{}", to_line(item));
            }
        }
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(to_row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a message (suppressed by --quiet, wrapped in an object in JSON mode)
pub fn print_message(message: &str) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Print an error message in the view, not as a process failure
pub fn print_error(message: &str) {
    if is_json_output() {
        println!("{}", serde_json::json!({ "error": message }));
    } else {
        println!("{}", message.red());
    }
}

/// Heading text, tinted for the active theme
pub fn heading(text: &str) -> String {
    if DARK.load(Ordering::Relaxed) {
        text.bright_cyan().bold().to_string()
    } else {
        text.blue().bold().to_string()
    }
}

pub fn label(text: &str) -> String {
    text.bold().to_string()
}

pub fn muted(text: &str) -> String {
    text.bright_black().to_string()
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Value or a placeholder when blank
pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(placeholder)
}
