use festive_core::{PanelDataset, PanelId, PanelStatus};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print rows under `headers`. Numeric-looking cells (amounts, counts,
/// percentages) are right-aligned so magnitudes line up down a column.
/// Widths count chars, not bytes, so `₹` pads correctly.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", render_row(headers.iter().copied(), &widths));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", rule.join("  "));
    for row in &rows {
        println!("{}", render_row(row.iter().map(String::as_str), &widths));
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| {
            if is_numeric(cell) {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn is_numeric(cell: &str) -> bool {
    let body = cell.strip_prefix('-').unwrap_or(cell);
    let body = body.strip_prefix('₹').unwrap_or(body);
    let body = ["%", "Cr", "K", "L"]
        .iter()
        .find_map(|suffix| body.strip_suffix(suffix))
        .unwrap_or(body);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_and_percentages_are_numeric() {
        assert!(is_numeric("₹5,00,000"));
        assert!(is_numeric("-₹1.2K"));
        assert!(is_numeric("12.34%"));
        assert!(is_numeric("3.5Cr"));
        assert!(is_numeric("1200"));
        assert!(!is_numeric("Instagram*"));
        assert!(!is_numeric("Oct 20"));
        assert!(!is_numeric("2023-10-20"));
    }

    #[test]
    fn numeric_cells_align_right() {
        let widths = [9, 6];
        assert_eq!(render_row(["Revenue", "₹5.0K"].into_iter(), &widths), "Revenue     ₹5.0K");
        assert_eq!(render_row(["ID", "7"].into_iter(), &widths), "ID              7");
    }
}
