use crate::error::EnrichError;

/// Columns every marketplace export must carry before enrichment can run.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Product Line", "Product Name", "Set", "Number"];

/// Index-addressable table: header row plus data rows of text cells.
///
/// Rows are owned by the table and addressed by (row, column) index; there
/// are no shared row objects to alias. Short rows are padded with empty
/// cells on load so every row has one cell per header.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV text as-is: every data row is kept.
    pub fn from_csv(csv_data: &str) -> Result<Self, EnrichError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| EnrichError::CsvParse(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| EnrichError::CsvParse(e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Parse a marketplace export: the trailing non-data row every export
    /// carries is dropped unconditionally, then the required columns are
    /// checked. Missing columns are fatal; no partial output.
    pub fn from_export(csv_data: &str) -> Result<Self, EnrichError> {
        let mut table = Self::from_csv(csv_data)?;

        // Exports end with a trailing summary row, not card data. Dropped
        // unconditionally; re-confirm with the export source if this changes.
        if !table.rows.is_empty() {
            table.rows.pop();
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| table.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EnrichError::MissingColumns(missing));
        }

        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of an exactly-named column.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, appending the column (empty cells throughout) if
    /// the table does not have it yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.rows[row][col] = value.into();
    }

    /// Serialize with `\n` terminators regardless of platform.
    pub fn to_csv(&self) -> Result<String, EnrichError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(vec![]);

        writer
            .write_record(&self.headers)
            .map_err(|e| EnrichError::CsvWrite(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| EnrichError::CsvWrite(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| EnrichError::CsvWrite(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| EnrichError::CsvWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Product Line,Product Name,Set,Number,Condition,Quantity
Magic,Lightning Bolt,Limited Edition Alpha,161,Near Mint,4
Magic,Black Lotus,Limited Edition Alpha,232,Lightly Played Foil,1
Orders Contained: 2,,,,,
";

    #[test]
    fn from_csv_keeps_all_rows() {
        let table = Table::from_csv(EXPORT).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers().len(), 6);
    }

    #[test]
    fn from_export_drops_trailing_row() {
        let table = Table::from_export(EXPORT).unwrap();
        assert_eq!(table.len(), 2);
        let name = table.column("Product Name").unwrap();
        assert_eq!(table.get(1, name), "Black Lotus");
    }

    #[test]
    fn from_export_empty_table_has_nothing_to_drop() {
        let table =
            Table::from_export("Product Line,Product Name,Set,Number\n").unwrap();
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn from_export_rejects_missing_columns() {
        let err = Table::from_export("Product Name,Quantity\nBolt,4\nx,\n").unwrap_err();
        match err {
            EnrichError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Product Line", "Set", "Number"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
        let msg = Table::from_export("Product Name,Quantity\nBolt,4\nx,\n")
            .unwrap_err()
            .to_string();
        assert!(msg.contains("Product Line, Set, Number"), "message: {msg}");
    }

    #[test]
    fn short_rows_are_padded() {
        let table = Table::from_csv("A,B,C\n1,2\n").unwrap();
        assert_eq!(table.get(0, 2), "");
    }

    #[test]
    fn ensure_column_appends_and_backfills() {
        let mut table = Table::from_csv("A,B\n1,2\n3,4\n").unwrap();
        let idx = table.ensure_column("Color");
        assert_eq!(idx, 2);
        assert_eq!(table.get(0, 2), "");
        assert_eq!(table.get(1, 2), "");
        // Idempotent: second call returns the same index.
        assert_eq!(table.ensure_column("Color"), 2);
        assert_eq!(table.headers().len(), 3);
    }

    #[test]
    fn to_csv_round_trips_with_newline_terminator() {
        let mut table = Table::from_csv("A,B\nx,y\n").unwrap();
        let idx = table.ensure_column("C");
        table.set(0, idx, "with,comma");
        let out = table.to_csv().unwrap();
        assert_eq!(out, "A,B,C\nx,y,\"with,comma\"\n");
    }
}
