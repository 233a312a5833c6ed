//! `pullsheet checklist` — printable pull list HTML from an enriched CSV.

use std::fs;
use std::path::PathBuf;

use pullsheet_enrich::Table;

use crate::CliError;

const STYLE: &str = "\
  @media print {
    @page { size: A4 portrait; margin: 12mm; }
  }
  body { font-family: -apple-system, BlinkMacSystemFont, Segoe UI, Roboto, Arial, sans-serif; }
  h1 { font-size: 18pt; margin: 0 0 10px; }
  .meta { font-size: 10pt; color: #444; margin-bottom: 12px; }
  table { width: 100%; border-collapse: collapse; }
  th, td { border: 1px solid #ccc; padding: 6px 8px; font-size: 10.5pt; }
  th { background: #f5f5f5; text-align: left; }
  td.cb { width: 22px; text-align: center; font-weight: bold; }
  .footer { margin-top: 14px; font-size: 9pt; color: #666; }";

/// Render the checklist document. Pure: the date is injected so output is
/// reproducible under test.
pub fn render(table: &Table, date: &str) -> String {
    let name_col = table.column("Product Name");
    let qty_col = table.column("Quantity");
    let color_col = table.column("Color");
    let number_col = table.column("Number");
    let set_col = table.column("Set");
    let line_col = table.column("Product Line");
    let foil_col = table.column("Foil");
    let holo_col = table.column("Pokemon Holofoil");

    let mut rows_html = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        // Foil marker and holofoil kind fold into the name cell.
        let holo = cell(table, row, holo_col);
        let holo_suffix = if holo.is_empty() {
            String::new()
        } else {
            format!(" ({})", escape_html(holo))
        };
        rows_html.push(format!(
            "<tr><td class='cb'>☐</td><td>{}{}{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(cell(table, row, name_col)),
            escape_html(cell(table, row, foil_col)),
            holo_suffix,
            escape_html(cell(table, row, qty_col)),
            escape_html(cell(table, row, color_col)),
            escape_html(cell(table, row, number_col)),
            escape_html(cell(table, row, set_col)),
            escape_html(cell(table, row, line_col)),
        ));
    }
    let rows_html = rows_html.join("\n");

    // Quantities are text cells; anything non-numeric counts as zero, and
    // the total truncates like the exports' float-formatted quantities.
    let total_cards = match qty_col {
        Some(col) => {
            let sum: f64 = (0..table.len())
                .map(|row| table.get(row, col).trim().parse::<f64>().unwrap_or(0.0))
                .sum();
            sum as i64
        }
        None => 0,
    };
    let unique_items = table.len();

    format!(
        "<!doctype html>
<html>
<head>
<meta charset=\"utf-8\">
<title>TCGplayer Pull List Checklist {}</title>
<style>
{}
</style>
</head>
<body>
<h1>TCGplayer Pull List Checklist</h1>
<div class=\"meta\">Generated {}</div>
<div class=\"meta\" style=\"margin-bottom: 15px;\">
  <strong>Total Cards to Pull: {}</strong> | <strong>Unique Items: {}</strong>
</div>
<table>
  <thead>
    <tr><th>✓</th><th>Product Name*</th><th>Quantity</th><th>Color</th><th>Number</th><th>Set</th><th>Product Line</th></tr>
  </thead>
  <tbody>
{}
  </tbody>
</table>
<div class=\"footer\">* = Foil card | (H) = Holofoil, (RH) = Reverse Holofoil (Pokemon) | Tip: Use your browser's Print dialog to save as PDF or print directly.</div>
</body>
</html>",
        date, STYLE, date, total_cards, unique_items, rows_html,
    )
}

fn cell(table: &Table, row: usize, col: Option<usize>) -> &str {
    match col {
        Some(c) => table.get(row, c),
        None => "",
    }
}

/// Minimal HTML escape for text interpolated into the checklist.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn cmd_checklist(input: PathBuf, output: PathBuf) -> Result<(), CliError> {
    let csv_data = fs::read_to_string(&input)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", input.display(), e)))?;

    // The input is an already-enriched CSV, so every row is data: no
    // trailing-summary-row handling here.
    let table = Table::from_csv(&csv_data).map_err(|e| CliError::parse(e.to_string()))?;

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let html = render(&table, &date);

    fs::write(&output, html)
        .map_err(|e| CliError::io(format!("cannot write {}: {}", output.display(), e)))?;
    Ok(())
}
