use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::EnrichError;

/// Mapping from display set name to the short catalog set code.
///
/// Keys are case-sensitive exactly as they appear in export rows. Backed by
/// an ordered map so persisted JSON always comes out with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetCodeMap {
    entries: BTreeMap<String, String>,
}

impl SetCodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of name -> code. Any other shape (arrays,
    /// non-string values) is a parse error; callers decide whether that is
    /// fatal or falls back to a default map.
    pub fn from_json(text: &str) -> Result<Self, EnrichError> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|e| EnrichError::SetMapParse(e.to_string()))?;
        Ok(Self { entries })
    }

    pub fn get(&self, set_name: &str) -> Option<&str> {
        self.entries.get(set_name).map(|s| s.as_str())
    }

    pub fn contains(&self, set_name: &str) -> bool {
        self.entries.contains_key(set_name)
    }

    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.entries.insert(name.into(), code.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    /// Pretty JSON with sorted keys, for reproducible persistence.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_default()
    }
}

/// One set as reported by the catalog's set listing.
#[derive(Debug, Clone)]
pub struct SetEntry {
    pub name: String,
    pub code: String,
    pub released_at: Option<NaiveDate>,
}

/// Collapse a base-source set listing into a map, resolving name collisions
/// by release recency: a later release date wins, a dated entry beats an
/// undated one, and with no dates on either side the first-seen entry is
/// kept. Entries with a blank name or code are ignored.
pub fn consolidate(entries: &[SetEntry]) -> SetCodeMap {
    let mut best: BTreeMap<String, (String, Option<NaiveDate>)> = BTreeMap::new();

    for entry in entries {
        let name = entry.name.trim();
        let code = entry.code.trim();
        if name.is_empty() || code.is_empty() {
            continue;
        }

        match best.get(name) {
            None => {
                best.insert(name.to_string(), (code.to_string(), entry.released_at));
            }
            Some((_, existing_date)) => {
                let newer = match (entry.released_at, existing_date) {
                    (Some(current), Some(existing)) => current > *existing,
                    (Some(_), None) => true,
                    _ => false,
                };
                if newer {
                    best.insert(name.to_string(), (code.to_string(), entry.released_at));
                }
            }
        }
    }

    let entries = best
        .into_iter()
        .map(|(name, (code, _))| (name, code))
        .collect();
    SetCodeMap { entries }
}

/// A name present in both sources with differing codes. The base code stays
/// authoritative; the discrepancy is reported, never applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetConflict {
    pub name: String,
    pub base_code: String,
    pub secondary_code: String,
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub map: SetCodeMap,
    /// Secondary entries added because their name was absent from the base.
    pub added: usize,
    pub conflicts: Vec<SetConflict>,
}

/// Merge a secondary source into the base map. Names absent from the base
/// are added; names present in both keep the base code, and a
/// case-insensitive code mismatch is recorded as a conflict.
pub fn merge(base: &SetCodeMap, secondary: &SetCodeMap) -> MergeOutcome {
    let mut map = base.clone();
    let mut added = 0;
    let mut conflicts = Vec::new();

    for (name, code) in secondary.iter() {
        match map.get(name) {
            None => {
                map.insert(name.clone(), code.clone());
                added += 1;
            }
            Some(existing) => {
                if !existing.eq_ignore_ascii_case(code) {
                    conflicts.push(SetConflict {
                        name: name.clone(),
                        base_code: existing.to_string(),
                        secondary_code: code.clone(),
                    });
                }
            }
        }
    }

    MergeOutcome { map, added, conflicts }
}
