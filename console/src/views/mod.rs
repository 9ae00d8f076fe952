//! Plain-text rendering of list state: tables, skeletons, pagination,
//! error callouts and toasts.

pub mod roles;
pub mod users;

use admin_client::toast::{Toast, ToastKind};
use admin_client::PagedResult;

/// Cells wider than this are cut with an ellipsis.
const MAX_COLUMN_WIDTH: usize = 40;

pub const DEFAULT_ERROR: &str = "Something went wrong. Please try again.";

fn truncate_value(value: &str, max_width: usize) -> String {
    let len = value.chars().count();
    if len <= max_width {
        value.to_string()
    } else if max_width <= 3 {
        value.chars().take(max_width).collect()
    } else {
        let kept: String = value.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (idx, width) in widths.iter().enumerate() {
        line.push_str(&"─".repeat(width + 2));
        line.push(if idx == widths.len() - 1 { right } else { mid });
    }
    line.push('\n');
    line
}

fn cells(values: &[String], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (value, width) in values.iter().zip(widths) {
        let value = truncate_value(value, *width);
        let pad = width - value.chars().count();
        line.push(' ');
        line.push_str(&value);
        line.push_str(&" ".repeat(pad));
        line.push_str(" │");
    }
    line.push('\n');
    line
}

/// Boxed table. `footer`, when present, spans the full width below the rows.
pub fn table(headers: &[&str], rows: &[Vec<String>], footer: Option<String>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, value) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(value.chars().count()).min(MAX_COLUMN_WIDTH);
        }
    }

    // n columns, n-1 inner separators
    let inner_width = |widths: &[usize]| widths.iter().map(|width| width + 2).sum::<usize>() + widths.len() - 1;
    if let (Some(footer), Some(last)) = (&footer, widths.len().checked_sub(1)) {
        let needed = footer.chars().count() + 2;
        let inner = inner_width(&widths);
        if inner < needed {
            widths[last] += needed - inner;
        }
    }

    let headers: Vec<String> = headers.iter().map(|header| header.to_string()).collect();
    let mut out = border(&widths, '┌', '┬', '┐');
    out.push_str(&cells(&headers, &widths));
    out.push_str(&border(&widths, '├', '┼', '┤'));
    for row in rows {
        out.push_str(&cells(row, &widths));
    }

    if let Some(footer) = footer {
        let inner = inner_width(&widths);
        out.push_str(&border(&widths, '├', '┴', '┤'));
        let pad = inner.saturating_sub(footer.chars().count() + 2);
        out.push_str(&format!("│ {footer}{} │\n", " ".repeat(pad)));
        out.push_str(&format!("└{}┘\n", "─".repeat(inner)));
    } else {
        out.push_str(&border(&widths, '└', '┴', '┘'));
    }
    out
}

/// Placeholder rows shown while the first page is loading.
pub fn skeleton(headers: &[&str], rows: usize) -> String {
    let placeholder: Vec<Vec<String>> = (0..rows)
        .map(|_| headers.iter().map(|header| "░".repeat(header.len().max(6))).collect())
        .collect();
    table(headers, &placeholder, None)
}

/// `Page X of Y` with the available moves. Only rendered for multi-page results.
pub fn pagination_row<T>(page: &PagedResult<T>, current: u32, loading: bool) -> Option<String> {
    if page.pages <= 1 {
        return None;
    }

    let mut moves = Vec::new();
    if page.has_prev() && !loading {
        moves.push(":p Previous");
    }
    if page.has_next() && !loading {
        moves.push(":n Next");
    }
    if loading {
        moves.push("loading...");
    }

    Some(format!("Page {current} of {}    {}", page.pages, moves.join("  ")))
}

/// Inline error with an optional hint on how to retry.
pub fn error_callout(message: Option<&str>, hint: Option<&str>) -> String {
    let message = message.filter(|msg| !msg.is_empty()).unwrap_or(DEFAULT_ERROR);
    match hint {
        Some(hint) => format!("! {message}\n  {hint}\n"),
        None => format!("! {message}\n"),
    }
}

pub fn toast_line(toast: &Toast) -> String {
    let marker = match toast.kind {
        ToastKind::Success => "✓",
        ToastKind::Error => "✗",
    };
    match &toast.title {
        Some(title) => format!("{marker} {title}: {}", toast.message),
        None => format!("{marker} {}", toast.message),
    }
}
