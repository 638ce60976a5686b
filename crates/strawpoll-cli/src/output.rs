//! Rendering for tables, single records and JSON.
//!
//! Commands hand over both a [`Table`] (or key/value fields) and the
//! structured value behind it; the selected mode decides which one is
//! printed.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use strawpoll_core::Table;

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Table,
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Output {
    mode: Mode,
    color: bool,
}

impl Output {
    /// `--json` wins over `--plain`. Color needs a terminal on stdout.
    pub fn new(json: bool, plain: bool, no_color: bool) -> Self {
        let mode = if json {
            Mode::Json
        } else if plain {
            Mode::Plain
        } else {
            Mode::Table
        };
        Self {
            mode,
            color: !no_color && io::stdout().is_terminal(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_json(&self) -> bool {
        self.mode() == Mode::Json
    }

    /// Print `table`, or `value` in JSON mode.
    pub fn table<T: Serialize + ?Sized>(&self, table: &Table, value: &T) -> Result<()> {
        let mut out = io::stdout().lock();
        match self.mode {
            Mode::Json => write_json(&mut out, value),
            Mode::Plain => write_tsv(&mut out, table),
            Mode::Table => write_table(&mut out, table, self.color),
        }
    }

    /// Print a single resource as labelled fields.
    pub fn record<T: Serialize + ?Sized>(&self, fields: &[(&str, String)], value: &T) -> Result<()> {
        let mut out = io::stdout().lock();
        match self.mode {
            Mode::Json => write_json(&mut out, value),
            Mode::Plain => write_tsv(&mut out, &fields_table(fields)),
            Mode::Table => write_fields(&mut out, fields, self.color),
        }
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        write_json(&mut io::stdout().lock(), value)
    }

    /// Blank line between two tables in table mode only.
    pub fn gap(&self) -> Result<()> {
        if self.mode() == Mode::Table {
            writeln!(io::stdout().lock()).context("write output")?;
        }
        Ok(())
    }
}

fn fields_table(fields: &[(&str, String)]) -> Table {
    let mut table = Table::new(fields.iter().map(|(key, _)| *key));
    table.push_row(fields.iter().map(|(_, value)| value.clone()));
    table
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("encode JSON output")?;
    writeln!(out).context("write output")
}

/// Tab-separated, header first. Tabs and newlines inside cells become
/// spaces.
pub fn write_tsv<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    let lines = std::iter::once(&table.headers).chain(&table.rows);
    for cells in lines {
        let line: Vec<String> = cells.iter().map(|cell| sanitize(cell)).collect();
        writeln!(out, "{}", line.join("\t")).context("write output")?;
    }
    Ok(())
}

pub fn write_table<W: Write>(out: &mut W, table: &Table, color: bool) -> Result<()> {
    let widths = column_widths(table);

    let header = render_row(&table.headers, &widths, |cell| {
        if color {
            cell.bold().to_string()
        } else {
            cell.to_string()
        }
    });
    writeln!(out, "{header}").context("write output")?;

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join(COLUMN_GAP)).context("write output")?;

    for row in &table.rows {
        let line = render_row(row, &widths, str::to_string);
        writeln!(out, "{line}").context("write output")?;
    }
    Ok(())
}

/// `Key   value` lines with keys padded to a common width.
pub fn write_fields<W: Write>(out: &mut W, fields: &[(&str, String)], color: bool) -> Result<()> {
    let width = fields
        .iter()
        .map(|(key, _)| key.chars().count() + 1)
        .max()
        .unwrap_or(0);
    for (key, value) in fields {
        let label = pad(&format!("{key}:"), width);
        let label = if color {
            label.bold().to_string()
        } else {
            label
        };
        writeln!(out, "{label}{COLUMN_GAP}{value}").context("write output")?;
    }
    Ok(())
}

fn column_widths(table: &Table) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (index, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(index) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn render_row(cells: &[String], widths: &[usize], style: impl Fn(&str) -> String) -> String {
    let last = cells.len().saturating_sub(1);
    let rendered: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            // Pad before styling so escape codes don't count toward width.
            if index == last {
                style(cell)
            } else {
                style(&pad(cell, widths.get(index).copied().unwrap_or(0)))
            }
        })
        .collect();
    rendered.join(COLUMN_GAP)
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}

fn sanitize(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        let mut table = Table::new(["Option", "Votes"]);
        table.push_row(["Pizza", "3"]);
        table.push_row(["Crème brûlée", "12"]);
        table
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn table_is_aligned_with_rule() {
        let text = render(|out| write_table(out, &sample(), false));
        assert_eq!(
            text,
            "Option        Votes\n\
             ------------  -----\n\
             Pizza         3\n\
             Crème brûlée  12\n"
        );
    }

    #[test]
    fn colored_header_keeps_alignment() {
        let text = render(|out| write_table(out, &sample(), true));
        let header = text.lines().next().unwrap();
        assert!(header.contains("\u{1b}[1m"));
        assert!(header.contains("Option      "));
        assert_eq!(text.lines().nth(2), Some("Pizza         3"));
    }

    #[test]
    fn tsv_sanitizes_cells() {
        let mut table = Table::new(["Name", "Note"]);
        table.push_row(["Ann", "line one\nline\ttwo"]);
        let text = render(|out| write_tsv(out, &table));
        assert_eq!(text, "Name\tNote\nAnn\tline one line two\n");
    }

    #[test]
    fn fields_are_padded() {
        let fields = [("ID", "abc".to_string()), ("Title", "Lunch?".to_string())];
        let text = render(|out| write_fields(out, &fields, false));
        assert_eq!(text, "ID:     abc\nTitle:  Lunch?\n");
    }

    #[test]
    fn fields_as_tsv_have_one_header_row() {
        let fields = [("ID", "abc".to_string()), ("Votes", "4".to_string())];
        let text = render(|out| write_tsv(out, &fields_table(&fields)));
        assert_eq!(text, "ID\tVotes\nabc\t4\n");
    }

    #[test]
    fn json_is_pretty() {
        let text = render(|out| write_json(out, &json!({"id": "abc"})));
        assert_eq!(text, "{\n  \"id\": \"abc\"\n}\n");
    }

    #[test]
    fn json_wins_over_plain() {
        assert_eq!(Output::new(true, true, true).mode(), Mode::Json);
        assert_eq!(Output::new(false, true, true).mode(), Mode::Plain);
        assert_eq!(Output::new(false, false, true).mode(), Mode::Table);
    }
}
