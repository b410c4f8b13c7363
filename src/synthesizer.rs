use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::{debug, warn};

use crate::identity::Resolver;
use crate::model::event::{CalendarEvent, SynthesizedMatch};
use crate::model::match_record::RawMatchRecord;
use crate::model::team::TeamIdentity;
use crate::text::meaningful;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})[/.-](\d{4}|\d{2})\b").expect("date regex should be valid"));
// The third group catches a trailing digit or date separator ("15.03.2025"),
// which disqualifies the match.
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[:.hH](\d{2})(\d|[/.-]\d)?").expect("time regex should be valid"));

/// Separator between description fragments.
pub const DESCRIPTION_SEPARATOR: &str = " | ";

/// Why a raw record produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Neither the match date nor a round window could be read.
    UnparseableDate { text: String },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::UnparseableDate { text } => write!(f, "unparseable match date {:?}", text),
        }
    }
}

/// Inclusive date span of a competition round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RoundWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Turns raw fixture rows into calendar events in one named timezone.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    timezone: Tz,
}

impl Synthesizer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve both team names and synthesize the event.
    pub fn synthesize_match(&self, resolver: &Resolver, raw: &RawMatchRecord) -> Result<SynthesizedMatch, Skip> {
        let home = resolver.resolve(&raw.home_name_text);
        let away = resolver.resolve(&raw.away_name_text);
        let event = self.synthesize(raw, &home, &away)?;
        Ok(SynthesizedMatch { event, home, away })
    }

    /// Build the calendar event for one record.
    ///
    /// A date plus a time gives a timed event. Without a time the match
    /// covers its round window when the date lies inside it (or is unknown),
    /// otherwise its own day. No usable date and no window means [`Skip`].
    pub fn synthesize(
        &self,
        raw: &RawMatchRecord,
        home: &TeamIdentity,
        away: &TeamIdentity,
    ) -> Result<CalendarEvent, Skip> {
        let date = parse_date(&raw.date_text);
        let time = raw.time_text.as_deref().and_then(parse_time).or_else(|| parse_time(&raw.date_text));
        let window = raw.round_window_text.as_deref().and_then(parse_round_window);

        let summary = format!(
            "{} vs {} ({})",
            home.display_name(),
            away.display_name(),
            raw.source_competition.tag()
        );
        let location = meaningful(raw.venue_text.as_deref());
        let mut fragments = Vec::new();

        let span = match (date, time) {
            (Some(day), Some(clock)) => match self.local_to_utc(day, clock) {
                Some(instant_utc) => {
                    let description = describe(raw, fragments);
                    return Ok(CalendarEvent::Timed { instant_utc, summary, location, description });
                }
                None => {
                    warn!(date = %day, time = %clock, tz = %self.timezone, "Kick-off falls in a DST gap, keeping it as an all-day event");
                    fragments.push(format!("Time: {}", clock.format("%H:%M")));
                    (day, day)
                }
            },
            (Some(day), None) => match window {
                Some(w) if w.contains(day) => (w.start, w.end),
                _ => (day, day),
            },
            (None, _) => match window {
                Some(w) => (w.start, w.end),
                None => {
                    return Err(Skip::UnparseableDate { text: raw.date_text.clone() });
                }
            },
        };

        debug!(summary = %summary, start = %span.0, end = %span.1, "Synthesized all-day event");
        Ok(CalendarEvent::AllDay {
            start_date_local: span.0,
            end_date_local_inclusive: span.1,
            summary,
            location,
            description: describe(raw, fragments),
        })
    }

    /// Civil wall-clock time in the configured zone to an absolute instant.
    /// `None` when the time does not exist locally; on the repeated hour the
    /// earlier instant is used.
    pub fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn describe(raw: &RawMatchRecord, mut fragments: Vec<String>) -> Option<String> {
    if let Some(result) = meaningful(raw.result_text.as_deref()) {
        fragments.push(format!("Result: {}", result));
    }
    fragments.extend(raw.notes.iter().filter_map(|n| meaningful(Some(n))));
    if fragments.is_empty() { None } else { Some(fragments.join(DESCRIPTION_SEPARATOR)) }
}

/// First `dd/mm/yyyy` (or `dd/mm/yy`, read as 20yy) date in `text`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_RE.captures_iter(text).find_map(|c| date_from_captures(&c))
}

/// First clock time in `text`: `18:30`, `18.30`, `18h30` or `18:30h`.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    TIME_RE.captures_iter(text).find_map(|caps| {
        if caps.get(3).is_some() {
            return None;
        }
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)
    })
}

/// Window from the first two dates in `text`; a single date is a one-day window.
pub fn parse_round_window(text: &str) -> Option<RoundWindow> {
    let mut dates = DATE_RE.captures_iter(text).filter_map(|c| date_from_captures(&c));
    let start = dates.next()?;
    let end = dates.next().unwrap_or(start);
    if end < start {
        return None;
    }
    Some(RoundWindow { start, end })
}

fn date_from_captures(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
