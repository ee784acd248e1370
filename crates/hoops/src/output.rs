//! Output helpers for the `hoops` CLI: JSON, aligned tables, and colored
//! status labels.

use std::env;
use std::io::{self, Write};

use crossterm::tty::IsTty;
use owo_colors::OwoColorize;
use serde::Serialize;

use hoops_core::enums::{ProgressStatus, WeeklyStatus};
use hoops_engine::EngineError;

// Ayu Dark palette.
const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c);
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54);
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78);
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80);
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff);

pub const ICON_DONE: &str = "\u{2713}";
pub const ICON_ACTIVE: &str = "\u{25D0}";
pub const ICON_OPEN: &str = "\u{25CB}";
pub const ICON_LOCKED: &str = "\u{00B7}";

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut handle = io::stdout().lock();
    // Ignore broken pipes (e.g. piped to `head`).
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Print a table with headers, aligning columns to the widest cell.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut handle = io::stdout().lock();
    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| match widths.get(i) {
                Some(w) => format!("{c:<w$}"),
                None => c.clone(),
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let _ = writeln!(handle, "{}", line(headers.iter().map(|h| h.to_string()).collect()));
    let _ = writeln!(
        handle,
        "{}",
        line(widths.iter().map(|w| "-".repeat(*w)).collect())
    );
    for row in rows {
        let _ = writeln!(handle, "{}", line(row.clone()));
    }
}

/// Returns `true` if stdout is connected to a terminal.
pub fn is_tty() -> bool {
    io::stdout().is_tty()
}

/// Returns `true` if stdout should be colored.
pub fn supports_color() -> bool {
    color_enabled(|key| env::var(key).ok(), is_tty())
}

/// Color decision from the environment and the TTY state.
///
/// Honors `NO_COLOR`, `CLICOLOR=0`, `TERM=dumb`, and `CLICOLOR_FORCE`.
fn color_enabled(var: impl Fn(&str) -> Option<String>, tty: bool) -> bool {
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR").as_deref() == Some("0") || var("TERM").as_deref() == Some("dumb") {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some() {
        return true;
    }
    tty
}

fn paint(text: &str, (r, g, b): (u8, u8, u8)) -> String {
    if supports_color() {
        text.truecolor(r, g, b).to_string()
    } else {
        text.to_string()
    }
}

pub fn accent(text: &str) -> String {
    paint(text, ACCENT)
}

pub fn muted(text: &str) -> String {
    paint(text, MUTED)
}

pub fn pass(text: &str) -> String {
    paint(text, PASS)
}

/// Icon and label for a ladder status.
pub fn progress_status(status: ProgressStatus) -> String {
    let label = format!("{} {}", status_icon(status), status);
    match status {
        ProgressStatus::Completed => paint(&label, PASS),
        ProgressStatus::InProgress => paint(&label, WARN),
        ProgressStatus::Unlocked => label,
        ProgressStatus::Locked => paint(&label, MUTED),
    }
}

pub fn status_icon(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::Completed => ICON_DONE,
        ProgressStatus::InProgress => ICON_ACTIVE,
        ProgressStatus::Unlocked => ICON_OPEN,
        ProgressStatus::Locked => ICON_LOCKED,
    }
}

pub fn weekly_status(status: WeeklyStatus) -> String {
    match status {
        WeeklyStatus::Completed => paint(&format!("{ICON_DONE} completed"), PASS),
        WeeklyStatus::Active => format!("{ICON_ACTIVE} active"),
        WeeklyStatus::Expired => paint("expired", FAIL),
    }
}

/// Stable error category for an error chain.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .map_or("error", |e| e.kind().as_str())
}

/// Prints an error to stderr, as JSON in `--json` mode.
pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "kind": error_kind(err),
        });
        if let Ok(s) = serde_json::to_string_pretty(&body) {
            eprintln!("{s}");
        }
    } else {
        eprintln!("Error: {err:#}");
    }
}
