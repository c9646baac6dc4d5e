//! Terminal UI utilities.
//!
//! - `Table` - auto-sizing table with Unicode box-drawing borders
//! - `spinner` - progress spinner for long network operations

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Narrowest a column is shrunk to when the terminal is too small.
const MIN_COLUMN: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        print!("{}", self.render(term_width as usize));
    }

    /// Lay the table out within `max_width` columns.
    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(visible_len(&sanitize(cell)));
            }
        }
        shrink_to_fit(&mut widths, max_width);

        let sep = |left: &str, mid: &str, right: &str| {
            let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, inner.join(mid), right)
        };
        let line = |cells: Vec<String>| {
            let mut s = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let fitted = console::truncate_str(cell, *width, "...").to_string();
                let padding = width.saturating_sub(visible_len(&fitted));
                s.push_str(&format!(" {}{} │", fitted, " ".repeat(padding)));
            }
            s.push('\n');
            s
        };

        let mut out = sep("┌", "┬", "┐");
        out.push_str(&line(
            self.headers.iter().map(|h| h.bold().to_string()).collect(),
        ));
        out.push_str(&sep("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row.iter().map(|c| sanitize(c)).collect()));
        }
        out.push_str(&sep("└", "┴", "┘"));
        out
    }
}

/// Trim the widest column one char at a time until the table fits.
fn shrink_to_fit(widths: &mut [usize], max_width: usize) {
    let overhead = 3 + 3 * widths.len();
    let available = max_width.saturating_sub(overhead);
    let mut total: usize = widths.iter().sum();

    while total > available {
        let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if widest <= MIN_COLUMN {
            break;
        }
        widths[idx] -= 1;
        total -= 1;
    }
}

fn visible_len(s: &str) -> usize {
    console::strip_ansi_codes(s).chars().count()
}

fn sanitize(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}

pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ "),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pads_columns() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Origin", "Import", "Uses"]);
        table.add_row(vec!["R".into(), "github.com/x/y".into(), "2".into()]);
        table.add_row(vec!["too".into(), "few".into()]);

        let out = table.render(120);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "  │ Origin │ Import         │ Uses │");
        assert_eq!(lines[3], "  │ R      │ github.com/x/y │ 2    │");
    }

    #[test]
    fn test_shrink_to_fit_stops_at_minimum() {
        let mut widths = vec![30, 4];
        shrink_to_fit(&mut widths, 20);
        assert_eq!(widths, vec![MIN_COLUMN, 4]);
    }
}
