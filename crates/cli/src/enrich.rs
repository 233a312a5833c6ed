//! `pullsheet enrich` — fill the Color column and foil flags on an export.

use std::fs;
use std::path::{Path, PathBuf};

use pullsheet_enrich::{
    run, EnrichConfig, EnrichError, NullProgress, Progress, SetCodeMap,
};

use crate::checklist;
use crate::exit_codes;
use crate::scryfall::ScryfallClient;
use crate::CliError;

/// Set map bundled into the binary. `--set-map` replaces it wholesale.
const DEFAULT_SET_MAP: &str = include_str!("../data/set_code_map.json");

// ── Console progress ────────────────────────────────────────────────

/// Progress sink that mirrors each processed row to stderr.
pub struct ConsoleProgress {
    filled: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { filled: 0 }
    }
}

impl Progress for ConsoleProgress {
    fn row_skipped(&mut self, _i: usize, _total: usize, name: &str) {
        eprintln!("Skipping (missing set code or collector #): {}", name);
    }

    fn row_filled(
        &mut self,
        _i: usize,
        total: usize,
        name: &str,
        set_code: &str,
        number: &str,
        color_code: &str,
    ) {
        self.filled += 1;
        let shown = if color_code.is_empty() { "∅" } else { color_code };
        eprintln!(
            "Filled {} / {} — {} [{} {}] → {}",
            self.filled, total, name, set_code, number, shown,
        );
    }

    fn row_unmatched(&mut self, _i: usize, _total: usize, name: &str, set_code: &str, number: &str) {
        eprintln!("No match found: {} [{} {}]", name, set_code, number);
    }

    fn finish(&mut self, filled: usize, skipped: usize) {
        eprintln!("Done. Filled: {} | Skipped/Unknown: {}", filled, skipped);
    }
}

// ── Command ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_enrich(
    input: PathBuf,
    output: PathBuf,
    set_map: Option<PathBuf>,
    config_path: Option<PathBuf>,
    throttle_ms: Option<u64>,
    timeout_secs: Option<u64>,
    max_rows: Option<usize>,
    checklist_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    // 1. Layer the run configuration: file first, then flag overrides.
    let mut config = match &config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
            EnrichConfig::from_toml(&text).map_err(enrich_error)?
        }
        None => EnrichConfig::default(),
    };
    if let Some(ms) = throttle_ms {
        config.throttle_ms = ms;
    }
    if let Some(secs) = timeout_secs {
        config.timeout_secs = secs;
    }
    if let Some(n) = max_rows {
        config.max_rows = n;
    }
    config.validate().map_err(enrich_error)?;

    // 2. Resolve the set map. A broken override falls back to the
    //    built-in map with a warning rather than failing the run.
    let set_map = resolve_set_map(set_map.as_deref())?;

    // 3. Read the export.
    let csv_data = fs::read_to_string(&input)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", input.display(), e)))?;

    // 4. Run the enrichment against the live catalog.
    let catalog = ScryfallClient::new(config.timeout_secs);
    let show_progress = !quiet && atty::is(atty::Stream::Stderr);
    let mut console = ConsoleProgress::new();
    let mut null = NullProgress;
    let progress: &mut dyn Progress = if show_progress { &mut console } else { &mut null };

    let outcome = run(&config, &csv_data, &set_map, &catalog, progress).map_err(enrich_error)?;

    // 5. Write the enriched CSV and any requested side outputs.
    let enriched = outcome.table.to_csv().map_err(enrich_error)?;
    fs::write(&output, enriched)
        .map_err(|e| CliError::io(format!("cannot write {}: {}", output.display(), e)))?;

    if let Some(path) = &checklist_path {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let html = checklist::render(&outcome.table, &date);
        fs::write(path, html)
            .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;
    }

    if let Some(path) = &report_path {
        let json = serde_json::to_string_pretty(&outcome.report()).map_err(|e| CliError {
            code: exit_codes::EXIT_ERROR,
            message: format!("failed to serialize run report: {}", e),
            hint: None,
        })?;
        fs::write(path, json)
            .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;
    }

    if show_progress {
        eprintln!("Wrote {}", output.display());
        if let Some(path) = &checklist_path {
            eprintln!("Wrote {}", path.display());
        }
        if let Some(path) = &report_path {
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Load the set map from an explicit file, or fall back to the built-in one.
/// An unreadable or unparseable override file warns and falls back; only a
/// broken built-in map is fatal.
fn resolve_set_map(path: Option<&Path>) -> Result<SetCodeMap, CliError> {
    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(text) => match SetCodeMap::from_json(&text) {
                Ok(map) => return Ok(map),
                Err(e) => {
                    eprintln!("warning: {}; using built-in set map", e);
                }
            },
            Err(e) => {
                eprintln!(
                    "warning: cannot read {}: {}; using built-in set map",
                    path.display(),
                    e,
                );
            }
        }
    }
    SetCodeMap::from_json(DEFAULT_SET_MAP).map_err(enrich_error)
}

/// Map engine errors onto the exit code registry.
fn enrich_error(err: EnrichError) -> CliError {
    match err {
        EnrichError::MissingColumns(_) => CliError::schema(err.to_string()).with_hint(
            "expected a TCGplayer pull sheet export with Product Line, Product Name, Set, and Number columns",
        ),
        EnrichError::CsvParse(_) => CliError::parse(err.to_string()),
        EnrichError::CsvWrite(_) => CliError::io(err.to_string()),
        EnrichError::ConfigParse(_) | EnrichError::ConfigValidation(_) => {
            CliError::config(err.to_string())
        }
        EnrichError::SetMapParse(_) => CliError::parse(err.to_string()),
    }
}
