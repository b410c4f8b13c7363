use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::event::{CalendarEvent, SynthesizedMatch, TeamCalendar};
use crate::model::match_record::Competition;

/// Group synthesized matches into one calendar per club squad, keyed by slug.
///
/// A match lands in the bucket of every club identity on the pitch, so a
/// derby between two club squads appears in both calendars. Matches without
/// any club side are dropped.
pub fn aggregate(
    competition: Competition,
    category: &str,
    matches: impl IntoIterator<Item = SynthesizedMatch>,
) -> BTreeMap<String, TeamCalendar> {
    let mut buckets: BTreeMap<String, TeamCalendar> = BTreeMap::new();

    for m in matches {
        let mut sides = vec![&m.home];
        if m.away.slug_key != m.home.slug_key {
            sides.push(&m.away);
        }
        for identity in sides.into_iter().filter(|id| id.is_club) {
            buckets
                .entry(identity.slug_key.clone())
                .or_insert_with(|| TeamCalendar {
                    identity: identity.clone(),
                    competition,
                    category: category.to_string(),
                    ordered_events: Vec::new(),
                })
                .ordered_events
                .push(m.event.clone());
        }
    }

    for calendar in buckets.values_mut() {
        order_events(&mut calendar.ordered_events);
    }
    buckets
}

/// All-day events first, then timed ones, each chronologically; remaining
/// ties are broken on text so the order never depends on input order.
/// Identical events are kept once.
pub fn order_events(events: &mut Vec<CalendarEvent>) {
    events.sort_by(compare_events);
    events.dedup();
}

fn compare_events(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
    match (a, b) {
        (CalendarEvent::AllDay { .. }, CalendarEvent::Timed { .. }) => Ordering::Less,
        (CalendarEvent::Timed { .. }, CalendarEvent::AllDay { .. }) => Ordering::Greater,
        (CalendarEvent::Timed { instant_utc: x, .. }, CalendarEvent::Timed { instant_utc: y, .. }) => {
            x.cmp(y).then_with(|| compare_text(a, b))
        }
        (
            CalendarEvent::AllDay { start_date_local: s1, end_date_local_inclusive: e1, .. },
            CalendarEvent::AllDay { start_date_local: s2, end_date_local_inclusive: e2, .. },
        ) => (s1, e1).cmp(&(s2, e2)).then_with(|| compare_text(a, b)),
    }
}

fn compare_text(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
    a.summary()
        .cmp(b.summary())
        .then_with(|| a.location().cmp(&b.location()))
        .then_with(|| a.description().cmp(&b.description()))
}
