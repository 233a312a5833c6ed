//! `pullsheet sets` — maintain the set name to set code mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use pullsheet_enrich::{consolidate, merge, SetCodeMap, SetEntry};

use crate::exit_codes;
use crate::scryfall::{ScryfallClient, ScryfallSet, SETS_TIMEOUT_SECS};
use crate::CliError;
use crate::MapFormat;

// ── Set list filtering ──────────────────────────────────────────────

/// The catalog lists sets for several games. A set counts as Magic when it
/// says so, or when it says nothing and is not obviously merchandise.
fn is_magic_set(set: &ScryfallSet) -> bool {
    match set.game.as_deref() {
        Some(game) if !game.is_empty() => {
            let game = game.to_ascii_lowercase();
            game == "mtg" || game == "magic"
        }
        _ => set.set_type != "token" && set.set_type != "memorabilia",
    }
}

fn to_entries(sets: &[ScryfallSet]) -> Vec<SetEntry> {
    sets.iter()
        .map(|s| SetEntry {
            name: s.name.trim().to_string(),
            code: s.code.trim().to_string(),
            released_at: s
                .released_at
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        })
        .collect()
}

// ── Detailed format ─────────────────────────────────────────────────

/// Per-set record for `--format detailed`. Field order is the serialized
/// key order, kept alphabetical to match the sorted-keys persistence of
/// the simple format.
#[derive(Debug, Serialize)]
struct DetailedSetInfo {
    block: Option<String>,
    block_code: Option<String>,
    card_count: u64,
    digital: bool,
    foil_only: bool,
    icon_svg_uri: Option<String>,
    parent_set_code: Option<String>,
    released_at: String,
    scryfall_code: String,
    scryfall_id: String,
    set_type: String,
    tcgplayer_id: Option<u32>,
}

impl DetailedSetInfo {
    fn from_set(set: &ScryfallSet) -> Self {
        Self {
            block: set.block.clone(),
            block_code: set.block_code.clone(),
            card_count: set.card_count,
            digital: set.digital,
            foil_only: set.foil_only,
            icon_svg_uri: set.icon_svg_uri.clone(),
            parent_set_code: set.parent_set_code.clone(),
            released_at: set.released_at.clone().unwrap_or_default(),
            scryfall_code: set.code.clone(),
            scryfall_id: set.id.clone(),
            set_type: set.set_type.clone(),
            tcgplayer_id: set.tcgplayer_id,
        }
    }
}

/// Name-keyed detailed records. Blank names are dropped; on a name
/// collision the later listing entry wins.
fn detailed_mapping(sets: &[ScryfallSet]) -> BTreeMap<String, DetailedSetInfo> {
    let mut mapping = BTreeMap::new();
    for set in sets {
        let name = set.name.trim();
        if name.is_empty() {
            continue;
        }
        mapping.insert(name.to_string(), DetailedSetInfo::from_set(set));
    }
    mapping
}

// ── TCGplayer secondary source ──────────────────────────────────────

/// Load a TCGplayer set mapping file. Never fatal: a missing, malformed
/// or unrecognized file warns and yields `None`, and the merge proceeds
/// from the catalog alone.
fn load_tcgplayer_mapping(path: &Path, show_progress: bool) -> Option<SetCodeMap> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!(
                "warning: TCGplayer file not found: {} (skipping)",
                path.display(),
            );
            return None;
        }
        Err(e) => {
            eprintln!(
                "warning: failed to read TCGplayer file {}: {}",
                path.display(),
                e,
            );
            return None;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("warning: failed to parse TCGplayer JSON: {}", e);
            return None;
        }
    };

    let object = match value.as_object() {
        Some(obj) => obj,
        None => {
            eprintln!(
                "warning: unrecognized TCGplayer file format in {}",
                path.display(),
            );
            return None;
        }
    };

    // Simple format: every value is a plain code string.
    if object.values().all(|v| v.is_string()) {
        let mut map = SetCodeMap::new();
        for (name, code) in object {
            if let Some(code) = code.as_str() {
                map.insert(name.clone(), code);
            }
        }
        if show_progress {
            eprintln!("Loaded {} TCGplayer mappings (simple format)", map.len());
        }
        return Some(map);
    }

    // Detailed format: every value is an object carrying a tcgplayer_code.
    if object
        .values()
        .all(|v| v.is_object() && v.get("tcgplayer_code").is_some())
    {
        let mut map = SetCodeMap::new();
        for (name, info) in object {
            if let Some(code) = info.get("tcgplayer_code").and_then(|c| c.as_str()) {
                map.insert(name.clone(), code);
            }
        }
        if show_progress {
            eprintln!("Loaded {} TCGplayer mappings (detailed format)", map.len());
        }
        return Some(map);
    }

    eprintln!(
        "warning: unrecognized TCGplayer file format in {}",
        path.display(),
    );
    None
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Copy an existing output file aside before overwriting it.
fn backup_existing(output: &Path, show_progress: bool) -> Result<(), CliError> {
    if !output.exists() {
        return Ok(());
    }
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let backup_name = format!("{}.backup.{}", output.display(), stamp);
    fs::copy(output, &backup_name)
        .map_err(|e| CliError::io(format!("cannot back up {}: {}", output.display(), e)))?;
    if show_progress {
        eprintln!("Created backup: {}", backup_name);
    }
    Ok(())
}

fn fetch_magic_sets(show_progress: bool) -> Result<Vec<ScryfallSet>, CliError> {
    if show_progress {
        eprintln!("Fetching sets from Scryfall...");
    }
    let client = ScryfallClient::new(SETS_TIMEOUT_SECS);
    let sets = client.fetch_sets()?;
    if show_progress {
        eprintln!("Found {} sets from Scryfall", sets.len());
    }

    let magic: Vec<ScryfallSet> = sets.into_iter().filter(is_magic_set).collect();
    if show_progress {
        eprintln!("Filtered to {} Magic: The Gathering sets", magic.len());
    }
    Ok(magic)
}

// ── Commands ────────────────────────────────────────────────────────

pub fn cmd_sets_update(
    output: PathBuf,
    format: MapFormat,
    backup: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let show_progress = !quiet && atty::is(atty::Stream::Stderr);

    // 1. Preserve the previous mapping if asked.
    if backup {
        backup_existing(&output, show_progress)?;
    }

    // 2. Pull and filter the catalog set list.
    let magic = fetch_magic_sets(show_progress)?;

    // 3. Shape the mapping per the requested format.
    let (json, entries) = match format {
        MapFormat::Simple => {
            let map = consolidate(&to_entries(&magic));
            (map.to_json_pretty(), map.len())
        }
        MapFormat::Detailed => {
            let mapping = detailed_mapping(&magic);
            let json = serde_json::to_string_pretty(&mapping).map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to serialize set data: {}", e),
                hint: None,
            })?;
            (json, mapping.len())
        }
    };

    // 4. Write it out.
    fs::write(&output, json)
        .map_err(|e| CliError::io(format!("cannot write {}: {}", output.display(), e)))?;

    if show_progress {
        eprintln!("Saved {} entries to {}", entries, output.display());
    }

    Ok(())
}

pub fn cmd_sets_merge(
    tcgplayer_file: Option<PathBuf>,
    output: PathBuf,
    backup: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let show_progress = !quiet && atty::is(atty::Stream::Stderr);

    if backup {
        backup_existing(&output, show_progress)?;
    }

    // 1. Base mapping from the catalog.
    let magic = fetch_magic_sets(show_progress)?;
    let base = consolidate(&to_entries(&magic));
    if show_progress {
        eprintln!("Added {} sets from Scryfall", base.len());
    }

    // 2. Secondary mapping, best effort.
    let secondary = match &tcgplayer_file {
        Some(path) => {
            if show_progress {
                eprintln!("Loading TCGplayer mappings from {}...", path.display());
            }
            load_tcgplayer_mapping(path, show_progress)
        }
        None => None,
    };

    // 3. Merge. The base code always wins; discrepancies are reported,
    //    never applied.
    let merged = match secondary {
        Some(tcg) => {
            let outcome = merge(&base, &tcg);
            if show_progress {
                for conflict in &outcome.conflicts {
                    eprintln!(
                        "  Note: '{}' has different codes: Scryfall={}, TCGplayer={} (keeping Scryfall)",
                        conflict.name, conflict.base_code, conflict.secondary_code,
                    );
                }
                eprintln!("Added {} new sets from TCGplayer", outcome.added);
                let verified = tcg.len() - outcome.added;
                if verified > 0 {
                    eprintln!("Verified {} existing sets against TCGplayer", verified);
                }
            }
            outcome.map
        }
        None => base,
    };

    // 4. Write the consolidated mapping.
    fs::write(&output, merged.to_json_pretty())
        .map_err(|e| CliError::io(format!("cannot write {}: {}", output.display(), e)))?;

    if show_progress {
        eprintln!("Saved {} set mappings to {}", merged.len(), output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn set(name: &str, code: &str) -> ScryfallSet {
        ScryfallSet {
            name: name.to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    // ── Filtering ───────────────────────────────────────────────────

    #[test]
    fn test_is_magic_set_by_game_field() {
        let mut s = set("Aether Revolt", "aer");
        s.game = Some("mtg".to_string());
        assert!(is_magic_set(&s));

        s.game = Some("MTG".to_string());
        assert!(is_magic_set(&s));

        s.game = Some("magic".to_string());
        assert!(is_magic_set(&s));

        s.game = Some("pokemon".to_string());
        assert!(!is_magic_set(&s));
    }

    #[test]
    fn test_is_magic_set_without_game_field() {
        let mut s = set("Aether Revolt", "aer");
        s.set_type = "expansion".to_string();
        assert!(is_magic_set(&s));

        s.set_type = "token".to_string();
        assert!(!is_magic_set(&s));

        s.set_type = "memorabilia".to_string();
        assert!(!is_magic_set(&s));

        // Empty game string counts as absent.
        s.game = Some(String::new());
        s.set_type = "core".to_string();
        assert!(is_magic_set(&s));
    }

    #[test]
    fn test_to_entries_parses_release_dates() {
        let mut dated = set("Aether Revolt", "aer");
        dated.released_at = Some("2017-01-20".to_string());
        let mut garbled = set("Mystery", "mys");
        garbled.released_at = Some("someday".to_string());

        let entries = to_entries(&[dated, garbled]);
        assert_eq!(
            entries[0].released_at,
            NaiveDate::from_ymd_opt(2017, 1, 20),
        );
        assert_eq!(entries[1].released_at, None);
    }

    // ── Detailed format ─────────────────────────────────────────────

    #[test]
    fn test_detailed_mapping_serializes_alphabetical_keys() {
        let mut s = set("Aether Revolt", "aer");
        s.id = "a4a0db50".to_string();
        s.set_type = "expansion".to_string();
        s.released_at = Some("2017-01-20".to_string());
        s.tcgplayer_id = Some(1857);
        s.card_count = 194;

        let json = serde_json::to_string_pretty(&detailed_mapping(&[s])).unwrap();

        let order = [
            "\"block\"",
            "\"block_code\"",
            "\"card_count\"",
            "\"digital\"",
            "\"foil_only\"",
            "\"icon_svg_uri\"",
            "\"parent_set_code\"",
            "\"released_at\"",
            "\"scryfall_code\"",
            "\"scryfall_id\"",
            "\"set_type\"",
            "\"tcgplayer_id\"",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|key| json.find(key).unwrap_or_else(|| panic!("missing {}", key)))
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "keys out of order in: {}",
            json,
        );

        // Absent optionals serialize as null, absent dates as empty string.
        assert!(json.contains("\"block\": null"));
        assert!(json.contains("\"tcgplayer_id\": 1857"));
        assert!(json.contains("\"released_at\": \"2017-01-20\""));
    }

    #[test]
    fn test_detailed_mapping_skips_blank_names_and_overwrites_dupes() {
        let blank = set("   ", "xxx");
        let first = set("Promos", "pp1");
        let second = set("Promos", "pp2");

        let mapping = detailed_mapping(&[blank, first, second]);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["Promos"].scryfall_code, "pp2");
    }

    // ── TCGplayer loader ────────────────────────────────────────────

    #[test]
    fn test_load_tcgplayer_simple_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"Alpha Edition\": \"ALP\", \"Beta Edition\": \"BET\"}}").unwrap();

        let map = load_tcgplayer_mapping(file.path(), false).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Alpha Edition"), Some("ALP"));
    }

    #[test]
    fn test_load_tcgplayer_detailed_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{{\"Alpha Edition\": {{\"tcgplayer_code\": \"ALP\", \"tcgplayer_id\": 77}}}}",
        )
        .unwrap();

        let map = load_tcgplayer_mapping(file.path(), false).unwrap();
        assert_eq!(map.get("Alpha Edition"), Some("ALP"));
    }

    #[test]
    fn test_load_tcgplayer_empty_object_is_empty_map() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        let map = load_tcgplayer_mapping(file.path(), false).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_tcgplayer_missing_file() {
        assert!(load_tcgplayer_mapping(Path::new("/nonexistent/tcg.json"), false).is_none());
    }

    #[test]
    fn test_load_tcgplayer_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json at all").unwrap();
        assert!(load_tcgplayer_mapping(file.path(), false).is_none());
    }

    #[test]
    fn test_load_tcgplayer_rejects_mixed_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{{\"Alpha\": \"ALP\", \"Beta\": {{\"tcgplayer_code\": \"BET\"}}}}",
        )
        .unwrap();
        assert!(load_tcgplayer_mapping(file.path(), false).is_none());
    }

    #[test]
    fn test_load_tcgplayer_rejects_non_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[\"Alpha\", \"Beta\"]").unwrap();
        assert!(load_tcgplayer_mapping(file.path(), false).is_none());
    }

    // ── Backup ──────────────────────────────────────────────────────

    #[test]
    fn test_backup_existing_copies_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("set_code_map.json");
        fs::write(&output, "{}").unwrap();

        backup_existing(&output, false).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("set_code_map.json.backup.")
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "{}");
    }

    #[test]
    fn test_backup_missing_output_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        backup_existing(&dir.path().join("absent.json"), false).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
