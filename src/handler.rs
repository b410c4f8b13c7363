use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::aggregate::aggregate;
use crate::classification::{
    ClassificationCache, ClassificationOutcome, ClassificationSource, ClassificationTarget, HtmlTableSource,
    fetch_or_fallback,
};
use crate::config::Config;
use crate::error::Result;
use crate::ical::{IcsSettings, serialize};
use crate::identity::Resolver;
use crate::model::classification::Provenance;
use crate::model::event::TeamCalendar;
use crate::model::match_record::{Competition, RawMatchRecord};
use crate::output::{artifact_file_name, write_atomic};
use crate::synthesizer::Synthesizer;
use crate::upstream::{FeedClient, FeedConfig, Fetcher, MatchSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    Federated,
    Municipal,
    Classification,
}

/// Everything needed to turn raw rows into written calendar documents.
#[derive(Debug, Clone)]
pub struct Pipeline {
    resolver: Resolver,
    synthesizer: Synthesizer,
    ics: IcsSettings,
    output_dir: PathBuf,
}

/// Outcome of writing one batch of calendars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Result<Self> {
        let ics = config.ics_settings()?;
        Ok(Self {
            resolver: Resolver::new(config.club.clone()),
            synthesizer: Synthesizer::new(ics.timezone),
            ics,
            output_dir: config.output_dir.clone(),
        })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Raw rows of one listing to per-team calendars. Unusable rows are
    /// logged and dropped.
    pub fn build_calendars(
        &self,
        competition: Competition,
        category: &str,
        records: &[RawMatchRecord],
    ) -> BTreeMap<String, TeamCalendar> {
        let matches = records.iter().filter_map(|raw| match self.synthesizer.synthesize_match(&self.resolver, raw) {
            Ok(m) => Some(m),
            Err(skip) => {
                warn!(reason = %skip, home = %raw.home_name_text, away = %raw.away_name_text, "Dropping match row");
                None
            }
        });
        aggregate(competition, category, matches)
    }

    /// File name and document text for every calendar, in slug order.
    pub fn render(&self, calendars: &BTreeMap<String, TeamCalendar>) -> Vec<(String, String)> {
        calendars
            .values()
            .map(|cal| {
                let name = artifact_file_name(cal.competition, &cal.category, &cal.identity.slug_key);
                (name, serialize(cal, &self.ics))
            })
            .collect()
    }

    /// Overwrite each calendar's document. A failed write affects only that file.
    pub fn write_calendars(&self, calendars: &BTreeMap<String, TeamCalendar>) -> WriteSummary {
        let mut summary = WriteSummary::default();
        for (name, document) in self.render(calendars) {
            let path = self.output_dir.join(&name);
            match write_atomic(&path, &document) {
                Ok(()) => {
                    info!(file = %name, "Calendar written");
                    summary.written.push(path);
                }
                Err(e) => {
                    error!(error = %e, file = %name, "Failed to write calendar");
                    summary.failed.push(path);
                }
            }
        }
        summary
    }

    /// Fetch one listing and write its calendars. Fetch failures mean no
    /// events from this listing; nothing is written for it.
    #[instrument(level = "info", skip(self, source, feed), fields(category = %feed.category))]
    pub fn run_feed(&self, source: &dyn MatchSource, competition: Competition, feed: &FeedConfig) -> String {
        let records = match source.fetch_matches(competition, feed) {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, source = %feed.location(), "Match feed unavailable");
                return format!("{} {}: feed unavailable ({})", competition, feed.category, e);
            }
        };
        let calendars = self.build_calendars(competition, &feed.category, &records);
        let summary = self.write_calendars(&calendars);
        format!(
            "{} {}: {} rows, {} calendars written, {} failed",
            competition,
            feed.category,
            records.len(),
            summary.written.len(),
            summary.failed.len()
        )
    }
}

/// Provenance and size of every table refreshed on this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub tables: BTreeMap<String, ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub provenance: Provenance,
    pub rows: usize,
}

/// Refresh every configured table, one at a time.
pub fn run_classifications(
    source: &dyn ClassificationSource,
    cache: &ClassificationCache,
    targets: &[ClassificationTarget],
) -> (ClassificationReport, BTreeMap<String, ClassificationOutcome>) {
    let mut report = ClassificationReport::default();
    let mut outcomes = BTreeMap::new();
    for target in targets {
        let key = target.key();
        let outcome = fetch_or_fallback(source, cache, &key);
        info!(key = %key, provenance = %outcome.provenance, rows = outcome.rows.len(), "Classification ready");
        report
            .tables
            .insert(key.cache_key(), ReportEntry { provenance: outcome.provenance, rows: outcome.rows.len() });
        outcomes.insert(key.cache_key(), outcome);
    }
    (report, outcomes)
}

/// Run one workflow end to end against the configured upstreams.
pub fn run_workflow(config: &Config, workflow: Workflow) -> String {
    let fetcher = Fetcher::new(config.http_timeout());
    match workflow {
        Workflow::Federated | Workflow::Municipal => {
            let (competition, feeds) = match workflow {
                Workflow::Federated => (Competition::Federated, &config.federated_feeds),
                _ => (Competition::Municipal, &config.municipal_feeds),
            };
            let pipeline = match Pipeline::from_config(config) {
                Ok(p) => p,
                Err(e) => {
                    error!(error = %e, "Pipeline init failed");
                    return format!("{} init error: {}", competition, e);
                }
            };
            if feeds.is_empty() {
                return format!("{}: no feeds configured (skipped)", competition);
            }
            let client = FeedClient::new(fetcher);
            feeds
                .iter()
                .map(|feed| pipeline.run_feed(&client, competition, feed))
                .collect::<Vec<_>>()
                .join("; ")
        }
        Workflow::Classification => {
            if config.classifications.is_empty() {
                return "Classification: no tables configured (skipped)".to_string();
            }
            let source = HtmlTableSource::new(fetcher, &config.classifications);
            let cache = ClassificationCache::new(config.cache_path());
            let (report, _) = run_classifications(&source, &cache, &config.classifications);
            let live = report.tables.values().filter(|e| e.provenance == Provenance::Live).count();
            let text = match serde_json::to_string_pretty(&report) {
                Ok(text) => text,
                Err(e) => return format!("Classification report encoding failed: {}", e),
            };
            if let Err(e) = write_atomic(&config.report_path(), &text) {
                error!(error = %e, "Failed to write classification report");
            }
            format!("Classification: {} tables, {} live", report.tables.len(), live)
        }
    }
}
