//! Run configuration.
//!
//! A single JSON document; every field has a default so an empty object (or
//! no file at all) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classification::ClassificationTarget;
use crate::error::{Error, Result};
use crate::handler::Workflow;
use crate::ical::IcsSettings;
use crate::identity::ClubProfile;
use crate::upstream::FeedConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "FLORES_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "flores.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    pub prodid: String,
    pub uid_domain: String,
    pub match_duration_minutes: u32,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            prodid: "-//Las Flores//Calendarios//ES".to_string(),
            uid_domain: "calendarios.lasflores".to_string(),
            match_duration_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    /// Defaults to `<output_dir>/imd_clasificaciones.json`.
    pub cache_file: Option<PathBuf>,
    /// Defaults to `<output_dir>/clasificaciones_estado.json`.
    pub report_file: Option<PathBuf>,
    /// IANA timezone in which upstream wall-clock times are given.
    pub timezone: String,
    pub http_timeout_secs: u64,
    pub workflows: Vec<Workflow>,
    pub club: ClubProfile,
    pub calendar: CalendarOptions,
    pub federated_feeds: Vec<FeedConfig>,
    pub municipal_feeds: Vec<FeedConfig>,
    pub classifications: Vec<ClassificationTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("calendarios"),
            cache_file: None,
            report_file: None,
            timezone: "Europe/Madrid".to_string(),
            http_timeout_secs: 20,
            workflows: vec![Workflow::Federated, Workflow::Municipal, Workflow::Classification],
            club: ClubProfile::default(),
            calendar: CalendarOptions::default(),
            federated_feeds: Vec::new(),
            municipal_feeds: Vec::new(),
            classifications: Vec::new(),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.timezone()?;
        Ok(config)
    }

    /// Config path from the first CLI argument, `$FLORES_CONFIG`, or `flores.json`.
    pub fn locate(arg: Option<String>) -> PathBuf {
        arg.or_else(|| std::env::var(CONFIG_ENV).ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| Error::config(format!("unknown timezone {:?}: {}", self.timezone, e)))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(|| self.output_dir.join("imd_clasificaciones.json"))
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_file.clone().unwrap_or_else(|| self.output_dir.join("clasificaciones_estado.json"))
    }

    pub fn ics_settings(&self) -> Result<IcsSettings> {
        Ok(IcsSettings {
            timezone: self.timezone()?,
            prodid: self.calendar.prodid.clone(),
            uid_domain: self.calendar.uid_domain.clone(),
            match_duration: chrono::Duration::minutes(i64::from(self.calendar.match_duration_minutes)),
        })
    }
}
