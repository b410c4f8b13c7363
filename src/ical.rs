use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::event::{CalendarEvent, TeamCalendar};
use crate::text::slugify;

/// Rendering options shared by every document of a run.
#[derive(Debug, Clone)]
pub struct IcsSettings {
    pub timezone: Tz,
    pub prodid: String,
    pub uid_domain: String,
    /// Length given to timed events (`DTEND`).
    pub match_duration: Duration,
}

/// Render one team calendar as an iCalendar document.
///
/// Output depends only on the calendar content: `UID` and `DTSTAMP` are
/// always set explicitly, so nothing reads the clock or draws a random id.
/// Timed starts are re-derived from the stored instant in the configured zone
/// here, so DST is applied at render time.
pub fn serialize(calendar: &TeamCalendar, settings: &IcsSettings) -> String {
    let name = format!(
        "{} ({}) {}",
        calendar.identity.display_name(),
        calendar.competition.tag(),
        calendar.category
    );

    let mut ics = Calendar::empty();
    ics.append_property(("VERSION", "2.0"))
        .append_property(("PRODID", settings.prodid.as_str()))
        .append_property(("CALSCALE", "GREGORIAN"))
        .append_property(("METHOD", "PUBLISH"))
        .name(name.trim())
        .timezone(settings.timezone.name());
    ics.extend(calendar.ordered_events.iter().map(|event| to_ics_event(event, settings)));

    let out = ics.to_string();
    debug!(slug = %calendar.identity.slug_key, events = calendar.ordered_events.len(), bytes = out.len(), "Serialized calendar");
    out
}

fn to_ics_event(event: &CalendarEvent, settings: &IcsSettings) -> Event {
    let mut ics_event = Event::new();
    match event {
        CalendarEvent::Timed { instant_utc, summary, .. } => {
            let end = *instant_utc + settings.match_duration;
            ics_event
                .uid(&uid(&instant_utc.format("%Y%m%dT%H%M%SZ").to_string(), summary, settings))
                .timestamp(*instant_utc)
                .starts(zoned(instant_utc, settings.timezone))
                .ends(zoned(&end, settings.timezone));
        }
        CalendarEvent::AllDay { start_date_local, end_date_local_inclusive, summary, .. } => {
            let end_exclusive = end_date_local_inclusive.succ_opt().unwrap_or(*end_date_local_inclusive);
            ics_event
                .uid(&uid(&start_date_local.format("%Y%m%d").to_string(), summary, settings))
                .timestamp(start_date_local.and_time(NaiveTime::MIN).and_utc())
                .starts(*start_date_local)
                .ends(end_exclusive);
        }
    }
    ics_event.summary(event.summary());
    if let Some(location) = event.location() {
        ics_event.location(location);
    }
    if let Some(description) = event.description() {
        ics_event.description(description);
    }
    ics_event.done()
}

fn uid(stamp: &str, summary: &str, settings: &IcsSettings) -> String {
    format!("{}-{}@{}", stamp, slugify(summary, '-'), settings.uid_domain)
}

/// Local wall time of `instant` in `tz`, tagged with the zone name.
fn zoned(instant: &DateTime<Utc>, tz: Tz) -> CalendarDateTime {
    CalendarDateTime::WithTimezone {
        date_time: instant.with_timezone(&tz).naive_local(),
        tzid: tz.name().to_string(),
    }
}

/// Parse a document produced by [`serialize`] back into events.
///
/// Zoned starts are converted with their `TZID` (falling back to `default_tz`
/// for unknown names); date-only events get their inclusive end back.
pub fn read_document(text: &str, default_tz: Tz) -> Result<Vec<CalendarEvent>> {
    let unfolded = icalendar::parser::unfold(text);
    let calendar: Calendar = icalendar::parser::read_calendar(&unfolded)
        .map_err(|e| Error::Ics { message: format!("{}", e) })?
        .into();
    let mut events = Vec::new();

    for component in &calendar.components {
        let CalendarComponent::Event(e) = component else { continue };
        let summary = e.get_summary().unwrap_or_default().to_string();
        let location = e.get_location().map(str::to_string);
        let description = e.get_description().map(str::to_string);

        match e.get_start() {
            Some(DatePerhapsTime::Date(start)) => {
                let end_inclusive = match e.get_end() {
                    Some(DatePerhapsTime::Date(end)) => inclusive_range(start, end).1,
                    _ => start,
                };
                events.push(CalendarEvent::AllDay {
                    start_date_local: start,
                    end_date_local_inclusive: end_inclusive,
                    summary,
                    location,
                    description,
                });
            }
            Some(DatePerhapsTime::DateTime(dt)) => {
                let Some(instant_utc) = to_utc(dt, default_tz) else {
                    warn!(summary = %summary, "Skipping event whose local start does not exist");
                    continue;
                };
                events.push(CalendarEvent::Timed { instant_utc, summary, location, description });
            }
            None => warn!(summary = %summary, "Skipping event without DTSTART"),
        }
    }
    Ok(events)
}

fn to_utc(dt: CalendarDateTime, default_tz: Tz) -> Option<DateTime<Utc>> {
    match dt {
        CalendarDateTime::Utc(dt) => Some(dt),
        CalendarDateTime::Floating(naive) => default_tz.from_local_datetime(&naive).earliest().map(|d| d.with_timezone(&Utc)),
        CalendarDateTime::WithTimezone { date_time, tzid } => {
            let tz: Tz = tzid.parse().unwrap_or(default_tz);
            tz.from_local_datetime(&date_time).earliest().map(|d| d.with_timezone(&Utc))
        }
    }
}

/// Inclusive date range of an all-day event read from `DTSTART`/`DTEND` values.
pub fn inclusive_range(start: NaiveDate, end_exclusive: NaiveDate) -> (NaiveDate, NaiveDate) {
    (start, end_exclusive.pred_opt().unwrap_or(end_exclusive).max(start))
}
