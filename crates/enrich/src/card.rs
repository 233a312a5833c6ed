use serde::Deserialize;

/// The classification-relevant slice of a catalog card payload.
///
/// Every field tolerates absence: catalog entries routinely omit `colors`
/// and `color_indicator`, and classification must stay total over them.
/// `colors` distinguishes "present and empty" from "absent"; the colorless
/// rules depend on that difference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogCard {
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub color_indicator: Option<Vec<String>>,
}

/// Outcome of a catalog lookup. Transport errors, timeouts, non-success
/// statuses and empty search results all collapse to `NotFound`: a lookup
/// can fail a row, never the run.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(CatalogCard),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// External card catalog, injected into the orchestrator.
///
/// `set_code` is the short catalog code (not the display set name);
/// `collector_number` is expected pre-normalized.
pub trait CardCatalog {
    fn lookup(&self, set_code: &str, collector_number: &str, product_name: &str) -> Lookup;
}

/// Normalize a collector number for catalog lookup: trim, then strip the
/// trailing ".0" the export format produces when numbers round-trip through
/// floating point. Stripping repeats to a fixed point, so normalizing an
/// already-normalized value is a no-op. Letter suffixes ("123a") survive.
pub fn normalize_collector_number(raw: &str) -> String {
    let mut s = raw.trim();
    while let Some(stripped) = s.strip_suffix(".0") {
        s = stripped.trim_end();
    }
    s.to_string()
}
