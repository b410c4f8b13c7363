use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::match_record::Competition;
use crate::model::team::TeamIdentity;

/// A fixture as it will appear in a calendar.
///
/// All-day ranges are inclusive here; only the serializer turns the end into
/// the exclusive `DTEND` the interchange format expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarEvent {
    Timed {
        instant_utc: DateTime<Utc>,
        summary: String,
        location: Option<String>,
        description: Option<String>,
    },
    AllDay {
        start_date_local: NaiveDate,
        end_date_local_inclusive: NaiveDate,
        summary: String,
        location: Option<String>,
        description: Option<String>,
    },
}

impl CalendarEvent {
    pub fn summary(&self) -> &str {
        match self {
            CalendarEvent::Timed { summary, .. } | CalendarEvent::AllDay { summary, .. } => summary,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            CalendarEvent::Timed { location, .. } | CalendarEvent::AllDay { location, .. } => location.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            CalendarEvent::Timed { description, .. } | CalendarEvent::AllDay { description, .. } => {
                description.as_deref()
            }
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, CalendarEvent::AllDay { .. })
    }
}

/// A synthesized event together with the identities of both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedMatch {
    pub event: CalendarEvent,
    pub home: TeamIdentity,
    pub away: TeamIdentity,
}

/// Every fixture of one club squad in one competition category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCalendar {
    pub identity: TeamIdentity,
    pub competition: Competition,
    pub category: String,
    pub ordered_events: Vec<CalendarEvent>,
}
