//! Live standings with a last-known-good fallback.
//!
//! Each table is fetched live, validated, and on success stored in the cache
//! document under its [`CompetitionKey`], replacing the previous copy. Any
//! failure (transport, timeout, HTTP status, empty or malformed table) leaves
//! the cache file untouched and serves the stored copy instead.
//!
//! Column mapping, after an optional leading rank column:
//!
//! | index | field |
//! |---|---|
//! | 0 | team name (a `"N - "` prefix is read as the rank) |
//! | 1 | played |
//! | 2 | won |
//! | 3 | lost |
//! | 4 | for tally (sets won) |
//! | 5 | against tally (sets conceded) |
//! | last | points |
//!
//! Columns between index 5 and the last one (e.g. points ratios) are ignored.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::model::classification::{ClassificationRow, CompetitionKey, Provenance};
use crate::model::match_record::Competition;
use crate::output::write_atomic;
use crate::text::{normalize_entities, normalize_ws};
use crate::upstream::Fetcher;

/// Team name plus the six mapped numeric columns.
pub const MIN_COLUMNS: usize = 7;

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("row regex should be valid"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]>").expect("cell regex should be valid"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("tag regex should be valid"));
static RANK_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[-.)º]\s*(.*)$").expect("rank regex should be valid"));

/// Cell texts of a fetched standings table, header rows included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

/// One standings table to refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTarget {
    pub competition: Competition,
    pub group: String,
    /// `http(s)://` URL or local path of the ranking page.
    pub source: String,
}

impl ClassificationTarget {
    pub fn key(&self) -> CompetitionKey {
        CompetitionKey::new(self.competition, self.group.clone())
    }
}

/// Live standings endpoint.
pub trait ClassificationSource {
    fn fetch_table(&self, key: &CompetitionKey) -> Result<RawTable>;
}

/// Fetches ranking pages and extracts their table rows.
#[derive(Debug, Clone)]
pub struct HtmlTableSource {
    fetcher: Fetcher,
    locations: HashMap<String, String>,
}

impl HtmlTableSource {
    pub fn new(fetcher: Fetcher, targets: &[ClassificationTarget]) -> Self {
        let locations = targets.iter().map(|t| (t.key().cache_key(), t.source.clone())).collect();
        Self { fetcher, locations }
    }
}

impl ClassificationSource for HtmlTableSource {
    fn fetch_table(&self, key: &CompetitionKey) -> Result<RawTable> {
        let location = self
            .locations
            .get(&key.cache_key())
            .ok_or_else(|| Error::config(format!("no classification source for {}", key)))?;
        let html = self.fetcher.fetch_text(location)?;
        Ok(parse_html_table(&html))
    }
}

/// Extract `<tr>` rows of `<td>`/`<th>` cells, tags stripped and entities decoded.
pub fn parse_html_table(html: &str) -> RawTable {
    let rows = ROW_RE
        .captures_iter(html)
        .map(|row| {
            CELL_RE
                .captures_iter(&row[1])
                .map(|cell| normalize_ws(&normalize_entities(&TAG_RE.replace_all(&cell[1], " "))))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();
    RawTable { rows }
}

/// Validate a fetched table and map it to rows.
///
/// Rows with fewer than two cells and header rows (no numeric cell after the
/// first) are skipped. Every remaining row must have at least
/// [`MIN_COLUMNS`] columns whose mapped fields parse as numbers, and at least
/// one such row must exist; otherwise the whole table is rejected.
pub fn validate_table(table: &RawTable) -> Result<Vec<ClassificationRow>> {
    let mut rows = Vec::new();
    for (index, cells) in table.rows.iter().enumerate() {
        if cells.len() < 2 || is_header(cells) {
            continue;
        }
        rows.push(parse_row(cells).map_err(|reason| Error::invalid_table(format!("row {}: {}", index + 1, reason)))?);
    }
    if rows.is_empty() {
        return Err(Error::invalid_table("no data rows"));
    }
    Ok(rows)
}

fn is_header(cells: &[String]) -> bool {
    cells.iter().skip(1).all(|c| parse_number(c).is_none())
}

fn parse_row(cells: &[String]) -> std::result::Result<ClassificationRow, String> {
    let (mut rank, cells) = match cells.split_first() {
        Some((first, rest)) if rest.len() >= MIN_COLUMNS && parse_number(first).is_some() => {
            (parse_number(first), rest)
        }
        _ => (None, cells),
    };
    if cells.len() < MIN_COLUMNS {
        return Err(format!("{} columns, expected at least {}", cells.len(), MIN_COLUMNS));
    }

    let mut name = cells[0].clone();
    if let Some(caps) = RANK_PREFIX_RE.captures(&cells[0]) {
        if rank.is_none() {
            rank = caps[1].parse().ok();
        }
        name = caps[2].trim().to_string();
    }
    if name.is_empty() {
        return Err("empty team name".to_string());
    }

    let field = |i: usize, label: &str| parse_number(&cells[i]).ok_or_else(|| format!("{} {:?} is not a number", label, cells[i]));
    Ok(ClassificationRow {
        team_display_name: name,
        played: field(1, "played")?,
        won: field(2, "won")?,
        lost: field(3, "lost")?,
        for_tally: field(4, "for")?,
        against_tally: field(5, "against")?,
        points: field(cells.len() - 1, "points")?,
        rank,
    })
}

fn parse_number(s: &str) -> Option<u32> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() { None } else { s.parse().ok() }
}

/// Persisted last-known-good standings, one entry per cache key.
#[derive(Debug, Clone)]
pub struct ClassificationCache {
    path: PathBuf,
}

impl ClassificationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole cache document; a missing file is an empty cache.
    pub fn load(&self) -> Result<BTreeMap<String, Vec<ClassificationRow>>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn get(&self, key: &CompetitionKey) -> Option<Vec<ClassificationRow>> {
        match self.load() {
            Ok(mut entries) => entries.remove(&key.cache_key()),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Unreadable classification cache");
                None
            }
        }
    }

    /// Replace the entry for `key`, keeping every other entry.
    pub fn store(&self, key: &CompetitionKey, rows: &[ClassificationRow]) -> Result<()> {
        let mut entries = self.load().unwrap_or_else(|e| {
            warn!(error = %e, path = %self.path.display(), "Unreadable classification cache, starting a new one");
            BTreeMap::new()
        });
        entries.insert(key.cache_key(), rows.to_vec());
        write_atomic(&self.path, &serde_json::to_string_pretty(&entries)?)
    }
}

/// Standings handed to downstream rendering, tagged with their origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub rows: Vec<ClassificationRow>,
    pub provenance: Provenance,
}

/// Fetch-validate-persist with cache fallback. Never fails.
#[instrument(level = "info", skip(source, cache, key), fields(key = %key))]
pub fn fetch_or_fallback(
    source: &dyn ClassificationSource,
    cache: &ClassificationCache,
    key: &CompetitionKey,
) -> ClassificationOutcome {
    match source.fetch_table(key).and_then(|table| validate_table(&table)) {
        Ok(rows) => match cache.store(key, &rows) {
            Ok(()) => {
                info!(rows = rows.len(), "Stored live classification");
                ClassificationOutcome { rows, provenance: Provenance::Live }
            }
            Err(e) => {
                warn!(error = %e, "Live classification could not be persisted");
                ClassificationOutcome { rows, provenance: Provenance::Live }
            }
        },
        Err(e) => {
            warn!(error = %e, "Live classification unavailable, falling back to cache");
            match cache.get(key) {
                Some(rows) => ClassificationOutcome { rows, provenance: Provenance::Cached },
                None => ClassificationOutcome { rows: Vec::new(), provenance: Provenance::None },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn reads_rank_from_name_prefix() {
        let table = RawTable { rows: vec![row(&["1 - LAS FLORES MORADO", "5", "4", "1", "13", "4", "12"])] };
        let rows = validate_table(&table).expect("valid");
        assert_eq!(rows[0].rank, Some(1));
        assert_eq!(rows[0].team_display_name, "LAS FLORES MORADO");
        assert_eq!(rows[0].points, 12);
    }

    #[test]
    fn reads_rank_from_leading_column() {
        let table = RawTable { rows: vec![row(&["2", "CLUB RIVAL", "5", "3", "2", "10", "8", "1,25", "9"])] };
        let rows = validate_table(&table).expect("valid");
        assert_eq!(rows[0].rank, Some(2));
        assert_eq!(rows[0].team_display_name, "CLUB RIVAL");
        assert_eq!(rows[0].against_tally, 8);
        assert_eq!(rows[0].points, 9);
    }

    #[test]
    fn header_rows_are_skipped() {
        assert!(is_header(&row(&["Equipo", "PJ", "PG", "PP", "SF", "SC", "Ptos"])));
        assert!(!is_header(&row(&["LAS FLORES", "5", "4", "1", "13", "4", "12"])));
    }

    #[test]
    fn short_rows_reject_the_table() {
        let table = RawTable { rows: vec![row(&["LAS FLORES", "5", "12"])] };
        assert!(matches!(validate_table(&table), Err(Error::InvalidTable { .. })));
    }
}
