//! Scryfall catalog client.
//!
//! Card lookups walk a three-step cascade (direct collector-number URL,
//! set+number search, exact-name search) and report any failure along the
//! way as a per-row miss. The set list endpoint backs the `sets` commands
//! and fails hard instead: there is nothing useful to do with half a list.

use std::time::Duration;

use serde::Deserialize;

use pullsheet_enrich::{CardCatalog, CatalogCard, Lookup};

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

const SCRYFALL_API_BASE: &str = "https://api.scryfall.com";

/// Request timeout for the set list endpoint, in seconds.
pub(crate) const SETS_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("pullsheet/", env!("CARGO_PKG_VERSION"));

// ── Scryfall client ─────────────────────────────────────────────────

pub struct ScryfallClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ScryfallClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_base_url(timeout_secs, SCRYFALL_API_BASE.to_string())
    }

    pub fn with_base_url(timeout_secs: u64, base_url: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self { http, base_url }
    }

    /// GET a card by set code and collector number.
    /// Any transport error, non-200 status, or undecodable body is `None`.
    fn get_card(&self, set_code: &str, collector_number: &str) -> Option<CatalogCard> {
        let url = format!("{}/cards/{}/{}", self.base_url, set_code, collector_number);
        let resp = self.http.get(&url).send().ok()?;
        if resp.status() != reqwest::StatusCode::OK {
            return None;
        }
        let text = resp.text().ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Run a full-text search and return the first hit, if any.
    fn get_first_match(&self, query: &str) -> Option<CatalogCard> {
        let url = format!("{}/cards/search", self.base_url);
        let resp = self.http.get(&url).query(&[("q", query)]).send().ok()?;
        if resp.status() != reqwest::StatusCode::OK {
            return None;
        }
        let text = resp.text().ok()?;
        let page: SearchPage = serde_json::from_str(&text).ok()?;
        page.data.into_iter().next()
    }
}

impl CardCatalog for ScryfallClient {
    fn lookup(&self, set_code: &str, collector_number: &str, product_name: &str) -> Lookup {
        // 1. Direct collector-number URL: cheapest, covers most rows.
        if let Some(card) = self.get_card(set_code, collector_number) {
            return Lookup::Found(card);
        }

        // 2. Search by set and number. Catches variant numbering the
        //    direct URL rejects.
        let query = format!("e:{} cn:{}", set_code, collector_number);
        if let Some(card) = self.get_first_match(&query) {
            return Lookup::Found(card);
        }

        // 3. Exact product name within the set, as a last resort.
        let query = format!("!\"{}\" e:{}", product_name, set_code);
        if let Some(card) = self.get_first_match(&query) {
            return Lookup::Found(card);
        }

        Lookup::NotFound
    }
}

/// One page of `/cards/search` results.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<CatalogCard>,
}

// ── Set list ────────────────────────────────────────────────────────

/// One set from the `/sets` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScryfallSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub set_type: String,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub tcgplayer_id: Option<u32>,
    #[serde(default)]
    pub card_count: u64,
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub foil_only: bool,
    #[serde(default)]
    pub block_code: Option<String>,
    #[serde(default)]
    pub block: Option<String>,
    #[serde(default)]
    pub parent_set_code: Option<String>,
    #[serde(default)]
    pub icon_svg_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetListPage {
    #[serde(default)]
    object: String,
    #[serde(default)]
    data: Vec<ScryfallSet>,
}

impl ScryfallClient {
    /// Fetch the complete set list.
    pub fn fetch_sets(&self) -> Result<Vec<ScryfallSet>, CliError> {
        let url = format!("{}/sets", self.base_url);

        let resp = self.http.get(&url).send().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("Scryfall request failed: {}", e),
            hint: None,
        })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: format!("Scryfall error (HTTP {})", status.as_u16()),
                hint: None,
            });
        }

        let text = resp.text().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("failed to read Scryfall response body: {}", e),
            hint: None,
        })?;
        let page: SetListPage = serde_json::from_str(&text).map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_VALIDATION,
            message: format!("failed to parse Scryfall set list: {}", e),
            hint: None,
        })?;

        if page.object != "list" {
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_VALIDATION,
                message: format!(
                    "unexpected Scryfall response shape (object = {:?})",
                    page.object,
                ),
                hint: None,
            });
        }

        Ok(page.data)
    }
}
