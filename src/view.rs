//! Plain-text rendering of expenses for the terminal commands.

use crate::model::{Amount, Expense};
use chrono::NaiveDate;

const HEADERS: [&str; 5] = ["ID", "Date", "Description", "Category", "Amount"];

/// Renders `expenses` as a table followed by the total. Amounts are right-aligned.
pub(crate) fn render(expenses: &[Expense], total: Amount, currency: &str) -> String {
    let mut out = String::new();
    if expenses.is_empty() {
        out.push_str("No expenses yet.\n");
    } else {
        let rows: Vec<[String; 5]> = expenses
            .iter()
            .map(|e| {
                [
                    e.id().to_string(),
                    format_date(e.date()),
                    e.description().to_string(),
                    e.category().to_string(),
                    e.amount().display(currency),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        push_row(&mut out, &HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(rule.join("  ").as_str());
        out.push('\n');
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
        out.push('\n');
    }

    let noun = if expenses.len() == 1 {
        "expense"
    } else {
        "expenses"
    };
    out.push_str(&format!(
        "Total spent: {} ({} {noun})",
        total.display(currency),
        expenses.len()
    ));
    out
}

fn push_row(out: &mut String, row: &[String; 5], widths: &[usize; 5]) {
    let last = row.len() - 1;
    let cells: Vec<String> = row
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == last {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    out.push_str(cells.join("  ").trim_end());
    out.push('\n');
}

/// Shows `YYYY-MM-DD` dates as e.g. `05 Mar 2024`. Anything else is shown as entered.
pub(crate) fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d %b %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
