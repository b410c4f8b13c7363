use std::collections::BTreeMap;

use chrono_tz::Europe::Madrid;

use flores_calendars::aggregate::aggregate;
use flores_calendars::identity::Resolver;
use flores_calendars::model::event::{SynthesizedMatch, TeamCalendar};
use flores_calendars::model::match_record::{Competition, RawMatchRecord};
use flores_calendars::synthesizer::Synthesizer;

fn synthesize(records: &[RawMatchRecord]) -> Vec<SynthesizedMatch> {
    let synth = Synthesizer::new(Madrid);
    let resolver = Resolver::default();
    records.iter().filter_map(|r| synth.synthesize_match(&resolver, r).ok()).collect()
}

fn calendars(records: &[RawMatchRecord]) -> BTreeMap<String, TeamCalendar> {
    aggregate(Competition::Federated, "Cadete", synthesize(records))
}

fn fixtures() -> Vec<RawMatchRecord> {
    vec![
        RawMatchRecord::new(Competition::Federated, "15/03/2025", "C.D. LAS FLORES SEVILLA MORADO", "CLUB RIVAL")
            .with_time("18:30"),
        RawMatchRecord::new(Competition::Federated, "22/11/2025", "CV ALJARAFE", "CD Las Flores Amarillo 2025")
            .with_round_window("21/11/2025 - 23/11/2025"),
        RawMatchRecord::new(Competition::Federated, "29/03/2025", "LAS FLORES MORADO", "Las Flores Amarillo")
            .with_time("11:00"),
        RawMatchRecord::new(Competition::Federated, "08/03/2025", "LAS FLORES MORADO", "CV NERVION"),
        RawMatchRecord::new(Competition::Federated, "01/03/2025", "CV NERVION", "LAS FLORES MORADO").with_time("12:00"),
        RawMatchRecord::new(Competition::Federated, "01/03/2025", "CV NERVION", "CLUB RIVAL").with_time("12:00"),
    ]
}

#[test]
fn one_bucket_per_club_squad() {
    let cals = calendars(&fixtures());
    let keys: Vec<&str> = cals.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["las_flores_amarillo", "las_flores_morado"]);
    let purple = &cals["las_flores_morado"];
    assert_eq!(purple.identity.display_name(), "LAS FLORES MORADO");
    assert_eq!(purple.category, "Cadete");
    assert_eq!(purple.competition, Competition::Federated);
}

#[test]
fn derby_lands_in_both_buckets() {
    let cals = calendars(&fixtures());
    let derby = "LAS FLORES MORADO vs LAS FLORES AMARILLO (FEDERATED)";
    for slug in ["las_flores_morado", "las_flores_amarillo"] {
        let hits = cals[slug].ordered_events.iter().filter(|e| e.summary() == derby).count();
        assert_eq!(hits, 1, "derby missing from {}", slug);
    }
}

#[test]
fn matches_without_club_sides_are_dropped() {
    let cals = calendars(&fixtures());
    let total: usize = cals.values().map(|c| c.ordered_events.len()).sum();
    // six rows, one derby counted twice, one match between two opponents
    assert_eq!(total, 6);
    assert!(cals.values().all(|c| c.ordered_events.iter().all(|e| e.summary() != "CV NERVION vs CLUB RIVAL (FEDERATED)")));
}

#[test]
fn all_day_first_then_chronological() {
    let cals = calendars(&fixtures());
    let summaries: Vec<(bool, &str)> = cals["las_flores_morado"]
        .ordered_events
        .iter()
        .map(|e| (e.is_all_day(), e.summary()))
        .collect();
    assert_eq!(
        summaries,
        vec![
            (true, "LAS FLORES MORADO vs CV NERVION (FEDERATED)"),
            (false, "CV NERVION vs LAS FLORES MORADO (FEDERATED)"),
            (false, "LAS FLORES MORADO vs CLUB RIVAL (FEDERATED)"),
            (false, "LAS FLORES MORADO vs LAS FLORES AMARILLO (FEDERATED)"),
        ]
    );
}

#[test]
fn order_does_not_depend_on_input_order() {
    let forward = calendars(&fixtures());
    let mut reversed_input = fixtures();
    reversed_input.reverse();
    assert_eq!(forward, calendars(&reversed_input));

    let mut rotated = fixtures();
    rotated.rotate_left(2);
    assert_eq!(forward, calendars(&rotated));
}

#[test]
fn identical_rows_are_emitted_once() {
    let row = RawMatchRecord::new(Competition::Federated, "15/03/2025", "LAS FLORES MORADO", "CLUB RIVAL")
        .with_time("18:30");
    let cals = calendars(&[row.clone(), row.clone().with_venue("Pabellón"), row]);
    assert_eq!(cals["las_flores_morado"].ordered_events.len(), 2);
}
