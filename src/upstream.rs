use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, instrument};

use crate::error::{Error, Result};
use crate::model::feed::{FeedDocument, FeedRow};
use crate::model::match_record::{Competition, RawMatchRecord};
use crate::text::meaningful;

/// One listing published by the scraping collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Age category shown in artifact names (`CADETE`, `INFANTIL`...).
    pub category: String,
    /// `http(s)://` URL or local path; `{team_id}` is substituted.
    pub source: String,
    /// Opaque municipal team identifier.
    #[serde(default)]
    pub team_id: Option<String>,
}

impl FeedConfig {
    pub fn location(&self) -> String {
        match &self.team_id {
            Some(id) => self.source.replace("{team_id}", id),
            None => self.source.clone(),
        }
    }
}

/// Anything able to produce raw fixture rows for a listing.
pub trait MatchSource {
    fn fetch_matches(&self, competition: Competition, feed: &FeedConfig) -> Result<Vec<RawMatchRecord>>;
}

/// Reads text from HTTP(S) with a global timeout, or from the local disk.
#[derive(Debug, Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder().timeout_global(Some(timeout)).build().into();
        Self { agent }
    }

    #[instrument(level = "info", skip(self))]
    pub fn fetch_text(&self, location: &str) -> Result<String> {
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Ok(std::fs::read_to_string(location)?);
        }
        let response = {
            let _span = info_span!("upstream_fetch", url = %location).entered();
            self.agent.get(location).call()
        };
        let response = match response {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, url = %location, "Request failed");
                return Err(e.into());
            }
        };
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(Error::HttpStatus { url: location.to_string(), status });
        }
        let body = response.into_body().read_to_string()?;
        info!(bytes = body.len(), "Fetched upstream document");
        Ok(body)
    }
}

/// Match feed client: scraper JSON documents to [`RawMatchRecord`]s.
#[derive(Debug, Clone)]
pub struct FeedClient {
    fetcher: Fetcher,
}

impl FeedClient {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Parse a feed document body (no network).
    pub fn from_json(body: &str, competition: Competition) -> Result<Vec<RawMatchRecord>> {
        let doc: FeedDocument = serde_json::from_str(body)?;
        Ok(records_from_document(doc, competition))
    }
}

impl MatchSource for FeedClient {
    fn fetch_matches(&self, competition: Competition, feed: &FeedConfig) -> Result<Vec<RawMatchRecord>> {
        let body = self.fetcher.fetch_text(&feed.location())?;
        let records = Self::from_json(&body, competition)?;
        info!(category = %feed.category, %competition, rows = records.len(), "Loaded match feed");
        Ok(records)
    }
}

fn records_from_document(doc: FeedDocument, competition: Competition) -> Vec<RawMatchRecord> {
    let page_window = doc.round_window;
    doc.rows
        .into_iter()
        .map(|row| record_from_row(row, competition, page_window.as_deref()))
        .collect()
}

fn record_from_row(row: FeedRow, competition: Competition, page_window: Option<&str>) -> RawMatchRecord {
    let mut notes = Vec::new();
    if let Some(obs) = meaningful(row.obs_encuentro.as_deref()) {
        notes.push(format!("Notes: {}", obs));
    }
    if let Some(obs) = meaningful(row.obs_resultado.as_deref()) {
        notes.push(format!("Result notes: {}", obs));
    }
    RawMatchRecord {
        date_text: row.date,
        time_text: row.time,
        home_name_text: row.home,
        away_name_text: row.away,
        venue_text: row.venue,
        result_text: row.result,
        notes,
        round_window_text: row
            .round_window
            .filter(|w| !w.trim().is_empty())
            .or_else(|| page_window.map(str::to_string)),
        source_competition: competition,
    }
}
