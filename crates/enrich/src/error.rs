use std::fmt;

#[derive(Debug)]
pub enum EnrichError {
    /// CSV parse / read error in the input table.
    CsvParse(String),
    /// CSV serialization error while writing the enriched table.
    CsvWrite(String),
    /// Required columns absent from the input table. Fatal to the run.
    MissingColumns(Vec<String>),
    /// TOML parse / deserialization error in the run config.
    ConfigParse(String),
    /// Run config validation error (zero timeout, etc.).
    ConfigValidation(String),
    /// Set-code map JSON could not be parsed.
    SetMapParse(String),
}

impl fmt::Display for EnrichError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsvParse(msg) => write!(f, "CSV parse error: {msg}"),
            Self::CsvWrite(msg) => write!(f, "CSV write error: {msg}"),
            Self::MissingColumns(cols) => {
                write!(f, "missing required column(s): {}", cols.join(", "))
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SetMapParse(msg) => write!(f, "set code map parse error: {msg}"),
        }
    }
}

impl std::error::Error for EnrichError {}
