//! Table and document output for CLI commands
//!
//! Commands build a [`Table`] of plain string cells and let it render in
//! the selected format. Structured formats (JSON, YAML) serialize the
//! command's own row type instead, see [`print_serialized`].

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;

/// Widest a TSV column may grow before its cells are truncated
const MAX_COLUMN_WIDTH: usize = 40;

/// Rows of pre-formatted cells under fixed headers
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as text; JSON and YAML fall back to TSV
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Csv => self.render_csv(),
            OutputFormat::Md => Ok(self.render_md()),
            _ => Ok(self.render_tsv()),
        }
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let content = self
                    .rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0);
                h.len().max(content).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    fn render_tsv(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", style(h.to_uppercase()).bold(), w = w))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1)));
        out.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", truncate_str(c, *w), w = w))
                .collect();
            out.push_str(cells.join(" ").trim_end());
            out.push('\n');
        }
        out
    }

    fn render_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers).into_diagnostic()?;
        for row in &self.rows {
            wtr.write_record(row).into_diagnostic()?;
        }
        let bytes = wtr.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }

    fn render_md(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().copied());
        for row in &self.rows {
            builder.push_record(row.iter().map(|c| c.replace('|', "\\|")));
        }
        format!("{}\n", builder.build().with(Style::markdown()))
    }
}

/// Print a serializable value as JSON or YAML
pub fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Render an optional cell, `-` when absent
pub fn cell<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(&["part", "description"]);
        table.push(vec!["100-0001-01".to_string(), "Resistor, 10k".to_string()]);
        table.push(vec!["300-0001-01".to_string(), "Board | main".to_string()]);
        table
    }

    #[test]
    fn test_csv_quotes_fields() {
        let csv = sample().render(OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "part,description\n100-0001-01,\"Resistor, 10k\"\n300-0001-01,Board | main\n"
        );
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let md = sample().render(OutputFormat::Md).unwrap();
        assert!(md.contains("| part"));
        assert!(md.contains("Board \\| main"));
    }

    #[test]
    fn test_tsv_has_header_and_rows() {
        console::set_colors_enabled(false);
        let tsv = sample().render(OutputFormat::Tsv).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("PART"));
        assert!(lines[2].starts_with("100-0001-01"));
    }

    #[test]
    fn test_cell_placeholder() {
        assert_eq!(cell(Some(5)), "5");
        assert_eq!(cell::<u64>(None), "-");
    }
}
