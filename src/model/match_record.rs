use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream competition a match listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    /// Regional federation tournaments (per tournament / group listings).
    Federated,
    /// Municipal sports league (per team listings).
    Municipal,
}

impl Competition {
    /// Tag appended to event summaries, e.g. `"... (FEDERATED)"`.
    pub fn tag(self) -> &'static str {
        match self {
            Competition::Federated => "FEDERATED",
            Competition::Municipal => "MUNICIPAL",
        }
    }

    /// Prefix used for artifact file names and cache keys.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Competition::Federated => "federado",
            Competition::Municipal => "imd",
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One scraped fixture row, exactly as text came off the upstream page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatchRecord {
    pub date_text: String,
    pub time_text: Option<String>,
    pub home_name_text: String,
    pub away_name_text: String,
    pub venue_text: Option<String>,
    pub result_text: Option<String>,
    /// Free-text observation columns, in page order.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Round date-window text bracketing the match, when the page shows one.
    pub round_window_text: Option<String>,
    pub source_competition: Competition,
}

impl RawMatchRecord {
    pub fn new(
        source_competition: Competition,
        date_text: impl Into<String>,
        home_name_text: impl Into<String>,
        away_name_text: impl Into<String>,
    ) -> Self {
        Self {
            date_text: date_text.into(),
            time_text: None,
            home_name_text: home_name_text.into(),
            away_name_text: away_name_text.into(),
            venue_text: None,
            result_text: None,
            notes: Vec::new(),
            round_window_text: None,
            source_competition,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time_text = Some(time.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue_text = Some(venue.into());
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result_text = Some(result.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_round_window(mut self, window: impl Into<String>) -> Self {
        self.round_window_text = Some(window.into());
        self
    }
}
