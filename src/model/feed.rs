use serde::{Deserialize, Serialize};

/// Document published by the scraping collaborator for one listing
/// (a federated tournament group, or a municipal team page).
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub tournament_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    /// Round window shown at page level, applies to rows without their own.
    #[serde(default, rename = "jornada")]
    pub round_window: Option<String>,
    #[serde(default)]
    pub rows: Vec<FeedRow>,
}

/// One table row, column texts as scraped.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeedRow {
    #[serde(default, rename = "fecha")]
    pub date: String,
    #[serde(default, rename = "hora")]
    pub time: Option<String>,
    #[serde(default, rename = "local")]
    pub home: String,
    #[serde(default, rename = "visitante")]
    pub away: String,
    #[serde(default, rename = "resultado")]
    pub result: Option<String>,
    #[serde(default, rename = "lugar")]
    pub venue: Option<String>,
    #[serde(default, rename = "jornada")]
    pub round_window: Option<String>,
    #[serde(default)]
    pub obs_encuentro: Option<String>,
    #[serde(default)]
    pub obs_resultado: Option<String>,
}
