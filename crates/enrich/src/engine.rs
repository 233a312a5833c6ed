use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::card::{normalize_collector_number, CardCatalog, Lookup};
use crate::color::classify;
use crate::config::EnrichConfig;
use crate::error::EnrichError;
use crate::foil::{foil_marker, is_foil, pokemon_holofoil};
use crate::progress::Progress;
use crate::setmap::SetCodeMap;
use crate::table::Table;

/// Product line whose rows are eligible for catalog lookup.
pub const MAGIC_PRODUCT_LINE: &str = "Magic";

const COL_COLOR: &str = "Color";
const COL_FOIL: &str = "Foil";
const COL_IS_FOIL: &str = "Is Foil";
const COL_POKEMON_HOLOFOIL: &str = "Pokemon Holofoil";

/// Result of an enrichment run: the full table (all rows, eligible ones
/// updated in place) plus the outcome counters.
#[derive(Debug)]
pub struct EnrichOutcome {
    pub table: Table,
    pub filled: usize,
    pub skipped: usize,
}

impl EnrichOutcome {
    pub fn report(&self) -> RunReport {
        RunReport {
            filled: self.filled,
            skipped_or_unknown: self.skipped,
            rows: self.table.len(),
        }
    }
}

/// Run report as persisted to JSON. Field names are the report contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub filled: usize,
    pub skipped_or_unknown: usize,
    pub rows: usize,
}

struct ExportColumns {
    product_line: usize,
    product_name: usize,
    set_name: usize,
    number: usize,
    condition: Option<usize>,
}

fn export_columns(table: &Table) -> Result<ExportColumns, EnrichError> {
    let need = |name: &str| {
        table
            .column(name)
            .ok_or_else(|| EnrichError::MissingColumns(vec![name.to_string()]))
    };
    Ok(ExportColumns {
        product_line: need("Product Line")?,
        product_name: need("Product Name")?,
        set_name: need("Set")?,
        number: need("Number")?,
        condition: table.column("Condition"),
    })
}

/// Enrich a marketplace export.
///
/// Parses `csv_data` as an export (trailing row dropped, required columns
/// enforced), derives the foil columns for every row, then walks the
/// Magic-eligible rows in order resolving each against `catalog` and
/// writing the color classification back. Single-threaded and synchronous:
/// each lookup blocks until it returns or times out, and a courtesy delay
/// of `config.throttle_ms` follows each row's lookup sequence.
///
/// `filled + skipped` always equals the number of eligible rows processed
/// (after any `max_rows` cap).
pub fn run(
    config: &EnrichConfig,
    csv_data: &str,
    set_map: &SetCodeMap,
    catalog: &dyn CardCatalog,
    progress: &mut dyn Progress,
) -> Result<EnrichOutcome, EnrichError> {
    config.validate()?;
    let mut table = Table::from_export(csv_data)?;
    let cols = export_columns(&table)?;

    // Color is only added when absent: existing values survive and are
    // overwritten per matched row. The foil columns are always rewritten.
    let color_col = table.ensure_column(COL_COLOR);
    let foil_col = table.ensure_column(COL_FOIL);
    let is_foil_col = table.ensure_column(COL_IS_FOIL);
    let holo_col = table.ensure_column(COL_POKEMON_HOLOFOIL);

    match cols.condition {
        Some(cond) => {
            for row in 0..table.len() {
                let condition = table.get(row, cond).to_string();
                let product_line = table.get(row, cols.product_line).to_string();
                table.set(row, foil_col, foil_marker(&condition));
                table.set(row, is_foil_col, is_foil(&condition));
                table.set(row, holo_col, pokemon_holofoil(&condition, &product_line));
            }
        }
        None => {
            for row in 0..table.len() {
                table.set(row, foil_col, "");
                table.set(row, is_foil_col, "No");
                table.set(row, holo_col, "");
            }
        }
    }

    let mut eligible: Vec<usize> = (0..table.len())
        .filter(|&row| table.get(row, cols.product_line).trim() == MAGIC_PRODUCT_LINE)
        .collect();
    if config.max_rows > 0 && eligible.len() > config.max_rows {
        eligible.truncate(config.max_rows);
    }
    let total = eligible.len();

    let mut filled = 0;
    let mut skipped = 0;

    for (i, &row) in eligible.iter().enumerate() {
        let i = i + 1;
        let set_name = table.get(row, cols.set_name).trim().to_string();
        let set_code = set_map.get(&set_name).unwrap_or("").to_string();
        let number = normalize_collector_number(table.get(row, cols.number));
        let name = table.get(row, cols.product_name).trim().to_string();

        // No resolvable lookup key: skipped without a catalog call, and
        // without the courtesy delay.
        if set_code.is_empty() || number.is_empty() {
            skipped += 1;
            progress.row_skipped(i, total, &name);
            continue;
        }

        match catalog.lookup(&set_code, &number, &name) {
            Lookup::Found(card) => {
                let color = classify(&card);
                table.set(row, color_col, color.code());
                filled += 1;
                progress.row_filled(i, total, &name, &set_code, &number, color.code());
            }
            Lookup::NotFound => {
                skipped += 1;
                progress.row_unmatched(i, total, &name, &set_code, &number);
            }
        }

        if config.throttle_ms > 0 {
            thread::sleep(Duration::from_millis(config.throttle_ms));
        }
    }

    progress.finish(filled, skipped);

    Ok(EnrichOutcome {
        table,
        filled,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CatalogCard;
    use crate::progress::NullProgress;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Catalog stub keyed by (set_code, collector_number), counting calls.
    struct StubCatalog {
        cards: HashMap<(String, String), CatalogCard>,
        calls: Cell<usize>,
    }

    impl StubCatalog {
        fn new() -> Self {
            Self {
                cards: HashMap::new(),
                calls: Cell::new(0),
            }
        }

        fn with_card(mut self, set_code: &str, number: &str, card: CatalogCard) -> Self {
            self.cards
                .insert((set_code.to_string(), number.to_string()), card);
            self
        }
    }

    impl CardCatalog for StubCatalog {
        fn lookup(&self, set_code: &str, collector_number: &str, _product_name: &str) -> Lookup {
            self.calls.set(self.calls.get() + 1);
            match self
                .cards
                .get(&(set_code.to_string(), collector_number.to_string()))
            {
                Some(card) => Lookup::Found(card.clone()),
                None => Lookup::NotFound,
            }
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        skipped: usize,
        filled: usize,
        unmatched: usize,
        finished: Option<(usize, usize)>,
    }

    impl Progress for RecordingProgress {
        fn row_skipped(&mut self, _i: usize, _total: usize, _name: &str) {
            self.skipped += 1;
        }

        fn row_filled(
            &mut self,
            _i: usize,
            _total: usize,
            _name: &str,
            _set_code: &str,
            _number: &str,
            _color_code: &str,
        ) {
            self.filled += 1;
        }

        fn row_unmatched(
            &mut self,
            _i: usize,
            _total: usize,
            _name: &str,
            _set_code: &str,
            _number: &str,
        ) {
            self.unmatched += 1;
        }

        fn finish(&mut self, filled: usize, skipped: usize) {
            self.finished = Some((filled, skipped));
        }
    }

    fn fast_config() -> EnrichConfig {
        EnrichConfig {
            throttle_ms: 0,
            ..EnrichConfig::default()
        }
    }

    fn red_creature() -> CatalogCard {
        CatalogCard {
            color_identity: vec!["R".into()],
            type_line: "Creature — Goblin".into(),
            colors: Some(vec!["R".into()]),
            color_indicator: None,
        }
    }

    fn alpha_map() -> SetCodeMap {
        SetCodeMap::from_json(r#"{"Limited Edition Alpha":"lea"}"#).unwrap()
    }

    const EXPORT: &str = "\
Product Line,Product Name,Set,Number,Condition,Quantity
Magic,Lightning Bolt,Limited Edition Alpha,161,Near Mint,4
Magic,Unknown Card,Limited Edition Alpha,999,Near Mint Foil,1
Magic,Mystery Card,Unmapped Set,5,Near Mint,2
Pokemon,Pikachu,Base Set,58,Reverse Holofoil,3
Orders Contained: 4,,,,,
";

    #[test]
    fn filled_plus_skipped_equals_eligible_total() {
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let mut progress = RecordingProgress::default();

        let outcome = run(
            &fast_config(),
            EXPORT,
            &alpha_map(),
            &catalog,
            &mut progress,
        )
        .unwrap();

        // Three Magic rows: one filled, one unmatched, one skipped (no code).
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.filled + outcome.skipped, 3);
        assert_eq!(progress.finished, Some((1, 2)));
        assert_eq!(progress.filled, 1);
        assert_eq!(progress.unmatched, 1);
        assert_eq!(progress.skipped, 1);
    }

    #[test]
    fn trailing_export_row_is_dropped() {
        let catalog = StubCatalog::new();
        let outcome = run(
            &fast_config(),
            EXPORT,
            &SetCodeMap::new(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();
        assert_eq!(outcome.table.len(), 4);
    }

    #[test]
    fn unmapped_set_or_blank_number_skips_without_lookup() {
        let csv = "\
Product Line,Product Name,Set,Number,Condition
Magic,No Set Row,Unmapped Set,12,Near Mint
Magic,No Number Row,Limited Edition Alpha,,Near Mint
Magic,Padding,Limited Edition Alpha,1,Near Mint
";
        let catalog = StubCatalog::new();
        let outcome = run(
            &fast_config(),
            csv,
            &alpha_map(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();

        // Trailing row drop leaves two rows, both skipped pre-lookup.
        assert_eq!(outcome.skipped, 2);
        assert_eq!(catalog.calls.get(), 0);
    }

    #[test]
    fn cap_truncates_eligible_rows() {
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let config = EnrichConfig {
            max_rows: 1,
            ..fast_config()
        };

        let outcome = run(&config, EXPORT, &alpha_map(), &catalog, &mut NullProgress).unwrap();

        assert_eq!(outcome.filled + outcome.skipped, 1);
        assert_eq!(catalog.calls.get(), 1);
    }

    #[test]
    fn foil_columns_cover_every_row() {
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let outcome = run(
            &fast_config(),
            EXPORT,
            &alpha_map(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();

        let table = &outcome.table;
        let foil = table.column("Foil").unwrap();
        let is_foil = table.column("Is Foil").unwrap();
        let holo = table.column("Pokemon Holofoil").unwrap();
        let color = table.column("Color").unwrap();

        // Magic foil row
        assert_eq!(table.get(1, foil), "*");
        assert_eq!(table.get(1, is_foil), "Yes");
        assert_eq!(table.get(1, holo), "");
        // Pokémon reverse holofoil row gets foil flags and the suffix code.
        assert_eq!(table.get(3, foil), "*");
        assert_eq!(table.get(3, is_foil), "Yes");
        assert_eq!(table.get(3, holo), "RH");
        // Filled Magic row
        assert_eq!(table.get(0, color), "R");
        // Pokémon rows never get a color.
        assert_eq!(table.get(3, color), "");
    }

    #[test]
    fn missing_condition_column_defaults_foil_columns() {
        let csv = "\
Product Line,Product Name,Set,Number
Magic,Lightning Bolt,Limited Edition Alpha,161
Magic,Filler,Limited Edition Alpha,1
";
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let outcome = run(
            &fast_config(),
            csv,
            &alpha_map(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();

        let table = &outcome.table;
        assert_eq!(table.get(0, table.column("Foil").unwrap()), "");
        assert_eq!(table.get(0, table.column("Is Foil").unwrap()), "No");
        assert_eq!(table.get(0, table.column("Pokemon Holofoil").unwrap()), "");
    }

    #[test]
    fn existing_color_values_survive_for_unfilled_rows() {
        let csv = "\
Product Line,Product Name,Set,Number,Color
Pokemon,Pikachu,Base Set,58,keep-me
Magic,Lightning Bolt,Limited Edition Alpha,161,stale
Magic,Filler,Limited Edition Alpha,1,
";
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let outcome = run(
            &fast_config(),
            csv,
            &alpha_map(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();

        let table = &outcome.table;
        let color = table.column("Color").unwrap();
        assert_eq!(table.get(0, color), "keep-me");
        assert_eq!(table.get(1, color), "R");
    }

    #[test]
    fn collector_numbers_are_normalized_before_lookup() {
        let csv = "\
Product Line,Product Name,Set,Number,Condition
Magic,Lightning Bolt,Limited Edition Alpha,161.0,Near Mint
Magic,Filler,Limited Edition Alpha,1,Near Mint
";
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let outcome = run(
            &fast_config(),
            csv,
            &alpha_map(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();
        assert_eq!(outcome.filled, 1);
    }

    #[test]
    fn missing_required_columns_are_fatal() {
        let err = run(
            &fast_config(),
            "Product Name,Quantity\nBolt,1\nx,\n",
            &SetCodeMap::new(),
            &StubCatalog::new(),
            &mut NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, EnrichError::MissingColumns(_)));
    }

    #[test]
    fn report_counts_output_rows() {
        let catalog = StubCatalog::new().with_card("lea", "161", red_creature());
        let outcome = run(
            &fast_config(),
            EXPORT,
            &alpha_map(),
            &catalog,
            &mut NullProgress,
        )
        .unwrap();

        let report = outcome.report();
        assert_eq!(
            report,
            RunReport {
                filled: 1,
                skipped_or_unknown: 2,
                rows: 4,
            }
        );
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["skipped_or_unknown"], 2);
    }
}
