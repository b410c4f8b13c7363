use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::match_record::Competition;
use crate::text::slugify;

/// One line of a league standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub team_display_name: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    /// Sets won ("SF" column).
    pub for_tally: u32,
    /// Sets conceded ("SC" column).
    pub against_tally: u32,
    pub points: u32,
    pub rank: Option<u32>,
}

/// Where a standings list came from on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provenance {
    Live,
    Cached,
    None,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provenance::Live => "LIVE",
            Provenance::Cached => "CACHED",
            Provenance::None => "NONE",
        })
    }
}

/// Identifies one standings table: a competition and a group within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompetitionKey {
    pub competition: Competition,
    pub group: String,
}

impl CompetitionKey {
    pub fn new(competition: Competition, group: impl Into<String>) -> Self {
        Self { competition, group: group.into() }
    }

    /// Key under which the table is stored in the cache document.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.competition.file_prefix(), slugify(&self.group, '_'))
    }
}

impl fmt::Display for CompetitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
