use anyhow::Result;
use auditlens_compute::pipeline::report::AnomalyTable;
use auditlens_compute::ReviewReport;
use auditlens_core::RawTable;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const SECTION: Color = Color::Cyan;
    const WARNING: Color = Color::Yellow;
    const SUCCESS: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
}

/// Widest a table cell is printed before truncation.
const MAX_CELL_WIDTH: usize = 40;

/// Renders a review report for a human at the terminal.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self, source: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("auditlens"),
            ResetColor,
            Print(" - Audit Log Review\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Source: {}\n", source)),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn print_section(&self, title: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::SECTION),
            Print(title),
            ResetColor,
            Print("\n"),
        )?;
        Ok(())
    }

    /// Full human-readable report: preview, mapping, anomalies, summary.
    pub fn print_report(&self, table: &RawTable, report: &ReviewReport, preview_rows: usize) -> Result<()> {
        self.print_section("Raw Log Preview")?;
        let preview: Vec<Vec<String>> = table
            .head(preview_rows)
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        print_grid(table.columns(), &preview)?;

        self.print_section("Mapped Columns")?;
        let mut stdout = io::stdout();
        for (field, column) in report.mapping.iter() {
            match column {
                Some(col) => writeln!(stdout, "  {:<10} -> {}", field.name(), col)?,
                None => execute!(
                    stdout,
                    Print(format!("  {:<10} -> ", field.name())),
                    SetForegroundColor(Colors::DIM),
                    Print("Not Found\n"),
                    ResetColor,
                )?,
            }
        }

        self.print_section("Detected Anomalies")?;
        self.print_anomaly_table(&report.anomaly_table)?;

        if report.summary.has_anomalies() {
            self.print_warning(&report.status_line())?;
        } else {
            self.print_success(&report.status_line())?;
        }

        self.print_section("Compliance Summary")?;
        writeln!(io::stdout(), "{}", report.summary.text)?;
        Ok(())
    }

    fn print_anomaly_table(&self, table: &AnomalyTable) -> Result<()> {
        if table.is_empty() {
            return self.print_info("(none)");
        }
        print_grid(&table.headers, &table.rows)
    }

    pub fn print_warning(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::WARNING, msg)
    }

    pub fn print_success(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::SUCCESS, msg)
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::DIM, msg)
    }

    fn print_colored(&self, color: Color, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Left-aligned grid with a header rule. Long cells are cut with `...`.
fn print_grid(headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let clip = |s: &str| -> String {
        if s.chars().count() > MAX_CELL_WIDTH {
            let mut cut: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
            cut.push_str("...");
            cut
        } else {
            s.to_string()
        }
    };
    let headers: Vec<String> = headers.iter().map(|h| clip(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| clip(c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut stdout = io::stdout();
    writeln!(stdout, "  {}", line(&headers))?;
    writeln!(
        stdout,
        "  {}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    )?;
    for row in &rows {
        writeln!(stdout, "  {}", line(row))?;
    }
    stdout.flush()?;
    Ok(())
}
