use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use chrono_tz::Europe::Madrid;

use flores_calendars::classification::ClassificationTarget;
use flores_calendars::config::Config;
use flores_calendars::handler::{Pipeline, Workflow, run_workflow};
use flores_calendars::ical::read_document;
use flores_calendars::model::event::CalendarEvent;
use flores_calendars::model::match_record::Competition;
use flores_calendars::upstream::{FeedClient, FeedConfig, Fetcher};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    format!("{}/{}", FIXTURES, name)
}

fn client() -> FeedClient {
    FeedClient::new(Fetcher::new(std::time::Duration::from_secs(5)))
}

fn config_in(dir: &Path) -> Config {
    Config { output_dir: dir.to_path_buf(), ..Config::default() }
}

fn federated_feed() -> FeedConfig {
    FeedConfig { category: "Cadete Femenino".to_string(), source: fixture("federated_feed.json"), team_id: None }
}

fn municipal_feed() -> FeedConfig {
    FeedConfig {
        category: "Infantil".to_string(),
        source: fixture("municipal_{team_id}.json"),
        team_id: Some("feed".to_string()),
    }
}

#[test]
fn federated_feed_maps_rows_and_page_window() {
    let body = fs::read_to_string(fixture("federated_feed.json")).unwrap();
    let records = FeedClient::from_json(&body, Competition::Federated).expect("feed parses");
    assert_eq!(records.len(), 4);

    let first = &records[0];
    assert_eq!(first.date_text, "15/03/2025");
    assert_eq!(first.time_text.as_deref(), Some("18:30"));
    assert_eq!(first.home_name_text, "C.D. LAS FLORES SEVILLA MORADO");
    assert_eq!(first.result_text.as_deref(), Some("3 - 1"));
    assert_eq!(first.source_competition, Competition::Federated);
    assert_eq!(first.round_window_text.as_deref(), Some("Jornada 7 (21/11/2025 - 23/11/2025)"));

    // a row's own window wins over the page one
    assert_eq!(records[3].round_window_text.as_deref(), Some("Jornada 9 (05/12/2025 - 07/12/2025)"));
}

#[test]
fn municipal_feed_maps_observations_to_notes() {
    let body = fs::read_to_string(fixture("municipal_feed.json")).unwrap();
    let records = FeedClient::from_json(&body, Competition::Municipal).expect("feed parses");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].notes, vec!["Notes: Llevar segunda equipación".to_string()]);
    assert!(records[1].notes.is_empty(), "placeholder observations are dropped");
    assert_eq!(records[1].round_window_text, None);
}

#[test]
fn malformed_feed_is_an_error() {
    assert!(FeedClient::from_json("{ not json", Competition::Federated).is_err());
}

#[test]
fn team_id_is_substituted_into_the_source() {
    assert_eq!(municipal_feed().location(), fixture("municipal_feed.json"));
    assert_eq!(federated_feed().location(), fixture("federated_feed.json"));
}

#[test]
fn federated_run_writes_one_calendar_per_squad() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&config_in(dir.path())).unwrap();

    let summary = pipeline.run_feed(&client(), Competition::Federated, &federated_feed());
    assert!(summary.contains("4 rows"), "{}", summary);
    assert!(summary.contains("2 calendars written"), "{}", summary);

    let mut names: Vec<String> =
        fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "federado_cadete_femenino_las_flores_amarillo.ics".to_string(),
            "federado_cadete_femenino_las_flores_morado.ics".to_string(),
        ]
    );

    let yellow = fs::read_to_string(dir.path().join("federado_cadete_femenino_las_flores_amarillo.ics")).unwrap();
    let events = read_document(&yellow, Madrid).unwrap();
    let summaries: Vec<&str> = events.iter().map(|e| e.summary()).collect();
    assert_eq!(
        summaries,
        vec![
            "CV ALJARAFE vs LAS FLORES AMARILLO (FEDERATED)",
            "CV DOS HERMANAS vs LAS FLORES AMARILLO (FEDERATED)",
            "LAS FLORES MORADO vs LAS FLORES AMARILLO (FEDERATED)",
        ]
    );
    assert!(yellow.contains("DTSTART;VALUE=DATE:20251121\r\n"));
    assert!(yellow.contains("DTEND;VALUE=DATE:20251124\r\n"));
    assert!(yellow.contains("DTSTART;VALUE=DATE:20251205\r\n"));
}

#[test]
fn rerunning_the_pipeline_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&config_in(dir.path())).unwrap();
    let read_all = || {
        let mut docs: Vec<(String, Vec<u8>)> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (e.file_name().to_string_lossy().into_owned(), fs::read(e.path()).unwrap())
            })
            .collect();
        docs.sort();
        docs
    };

    pipeline.run_feed(&client(), Competition::Federated, &federated_feed());
    pipeline.run_feed(&client(), Competition::Municipal, &municipal_feed());
    let first = read_all();

    pipeline.run_feed(&client(), Competition::Federated, &federated_feed());
    pipeline.run_feed(&client(), Competition::Municipal, &municipal_feed());
    assert_eq!(first, read_all());
    assert_eq!(first.len(), 3);
}

#[test]
fn municipal_run_drops_unusable_rows() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&config_in(dir.path())).unwrap();

    let summary = pipeline.run_feed(&client(), Competition::Municipal, &municipal_feed());
    assert!(summary.contains("1 calendars written"), "{}", summary);

    let text = fs::read_to_string(dir.path().join("imd_infantil_evb_las_flores_albero.ics")).unwrap();
    assert!(text.contains("SUMMARY:EVB LAS FLORES ALBERO vs AMATE\\, SAN PABLO (MUNICIPAL)\r\n"), "{}", text);
    assert!(!text.contains("CV NERVION"), "row without a date is skipped");

    let events = read_document(&text, Madrid).unwrap();
    assert_eq!(events.len(), 2);
    match &events[0] {
        CalendarEvent::AllDay { start_date_local, end_date_local_inclusive, description, .. } => {
            assert_eq!(*start_date_local, NaiveDate::from_ymd_opt(2025, 10, 25).unwrap());
            assert_eq!(start_date_local, end_date_local_inclusive);
            assert_eq!(*description, None);
        }
        other => panic!("expected an all-day event first, got {:?}", other),
    }
    match &events[1] {
        CalendarEvent::Timed { instant_utc, description, .. } => {
            assert_eq!(instant_utc.with_timezone(&Madrid).format("%Y-%m-%d %H:%M").to_string(), "2025-10-18 10:00");
            assert_eq!(description.as_deref(), Some("Result: 2 - 0 | Notes: Llevar segunda equipación"));
        }
        other => panic!("expected a timed event second, got {:?}", other),
    }
}

#[test]
fn unavailable_feed_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(&config_in(dir.path())).unwrap();
    let feed = FeedConfig { category: "Cadete".to_string(), source: fixture("missing.json"), team_id: None };

    let summary = pipeline.run_feed(&client(), Competition::Federated, &feed);
    assert!(summary.contains("feed unavailable"), "{}", summary);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn workflows_run_from_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        federated_feeds: vec![federated_feed()],
        classifications: vec![ClassificationTarget {
            competition: Competition::Municipal,
            group: "Grupo A".to_string(),
            source: fixture("classification.html"),
        }],
        ..config_in(dir.path())
    };

    let summary = run_workflow(&config, Workflow::Federated);
    assert!(summary.contains("2 calendars written"), "{}", summary);

    let summary = run_workflow(&config, Workflow::Municipal);
    assert!(summary.contains("skipped"), "{}", summary);

    let summary = run_workflow(&config, Workflow::Classification);
    assert_eq!(summary, "Classification: 1 tables, 1 live");
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(config.report_path()).unwrap()).unwrap();
    assert_eq!(report["tables"]["imd_grupo_a"]["provenance"], "LIVE");
    assert_eq!(report["tables"]["imd_grupo_a"]["rows"], 3);
    assert!(config.cache_path().exists());
}
