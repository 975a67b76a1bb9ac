#![forbid(unsafe_code)]
use chrono::{TimeZone, Utc};
use shiftmatch::{
    calendar::{render_calendar, write_calendars},
    fill_template,
    io::export_master_csv,
    master_table,
    model::{parse_timestamp, SlotAssignment},
    notification::write_notices,
    prepare_notices, Assignment, CalendarConfig, Interval, PersonName, SlotId, Timespan,
};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

fn at(raw: &str) -> chrono::DateTime<chrono::FixedOffset> {
    parse_timestamp(raw).unwrap()
}

fn festival_config() -> CalendarConfig {
    CalendarConfig {
        calendar_name: "Sommerfest".into(),
        event_name: "Schicht".into(),
        description: "Bring water, please; thanks".into(),
        location: "Main Gate".into(),
    }
}

fn alice_intervals() -> Vec<Interval> {
    vec![
        Interval {
            start: at("2023-07-16T19:20:00+01:00"),
            end: at("2023-07-16T21:20:00+01:00"),
            category: "Bar".into(),
        },
        Interval {
            start: at("2023-07-16T21:20:00+01:00"),
            end: at("2023-07-16T22:00:00+01:00"),
            category: "Gate".into(),
        },
    ]
}

#[test]
fn calendar_for_one_person() {
    let stamp = Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap();
    let ics = render_calendar(
        &PersonName::new("alice"),
        &alice_intervals(),
        &festival_config(),
        stamp,
    );
    assert!(ics.lines().all(|l| l.len() <= 76));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    let normalized = ics.replace("\r\n", "\n");
    insta::assert_snapshot!("alice_calendar", normalized.trim_end());
}

#[test]
fn one_calendar_file_per_person() {
    let dir = tempdir().unwrap();
    let mut by_person = BTreeMap::new();
    by_person.insert(PersonName::new("alice"), alice_intervals());
    by_person.insert(PersonName::new("bob/ops"), alice_intervals()[..1].to_vec());

    let stamp = Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap();
    let written = write_calendars(dir.path(), &by_person, &festival_config(), stamp).unwrap();
    assert_eq!(written.len(), 2);
    assert!(dir.path().join("alice.ics").exists());
    assert!(dir.path().join("bob_ops.ics").exists());

    let bob = fs::read_to_string(dir.path().join("bob_ops.ics")).unwrap();
    assert_eq!(bob.matches("BEGIN:VEVENT").count(), 1);
}

#[test]
fn master_table_csv_per_category() {
    let slot = |c: &str, a: &str, b: &str| SlotId::new(c, Timespan::new(at(a), at(b)).unwrap());
    let assignment = Assignment {
        slots: vec![
            SlotAssignment {
                slot: slot("Bar", "2024-06-01T20:00:00+02:00", "2024-06-01T22:00:00+02:00"),
                people: vec![PersonName::new("zoe"), PersonName::new("anna")],
            },
            SlotAssignment {
                slot: slot("Gate", "2024-06-01T18:00:00+02:00", "2024-06-01T20:00:00+02:00"),
                people: vec![],
            },
            SlotAssignment {
                slot: slot("Bar", "2024-06-01T18:00:00+02:00", "2024-06-01T20:00:00+02:00"),
                people: vec![PersonName::new("zoe")],
            },
        ],
    };

    let dir = tempdir().unwrap();
    let written = export_master_csv(dir.path(), &master_table(&assignment)).unwrap();
    assert_eq!(written.len(), 2);

    let bar = fs::read_to_string(dir.path().join("Bar.csv")).unwrap();
    let normalized = bar.replace("\r\n", "\n");
    insta::assert_snapshot!("bar_master_table", normalized.trim_end());

    let gate = fs::read_to_string(dir.path().join("Gate.csv")).unwrap();
    assert_eq!(gate.lines().count(), 2);
}

#[test]
fn calendar_text_is_escaped_folded_and_utc() {
    let config = CalendarConfig {
        description: format!("a,b;c\\d\n{}", "é".repeat(60)),
        ..festival_config()
    };
    let stamp = Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap();
    let ics = render_calendar(&PersonName::new("alice"), &alice_intervals(), &config, stamp);

    for line in ics.split("\r\n") {
        assert!(line.len() <= 75, "line too long: {line}");
    }
    let unfolded = ics.replace("\r\n ", "");
    assert!(unfolded.contains("DESCRIPTION:a\\,b\\;c\\\\d\\n"));
    assert!(unfolded.contains(&"é".repeat(60)));
    assert!(unfolded.contains("DTSTART:20230716T182000Z"));
}

#[test]
fn calendar_uids_are_stable_across_exports() {
    let uids = |stamp| {
        render_calendar(&PersonName::new("alice"), &alice_intervals(), &festival_config(), stamp)
            .lines()
            .filter(|l| l.starts_with("UID:"))
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    let first = uids(Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap());
    let second = uids(Utc.with_ymd_and_hms(2023, 7, 2, 9, 30, 0).unwrap());
    assert_eq!(first.len(), 2);
    assert_ne!(first[0], first[1]);
    assert_eq!(first, second);
}

#[test]
fn template_is_filled_once_per_index() {
    let merged = fill_template(
        "Hallo <name>! Deine Rolle ist <role>.",
        &[
            ("<name>", vec!["Frank".into(), "Sabine".into()]),
            ("<role>", vec!["Springer".into(), "Bar".into()]),
        ],
    );
    assert_eq!(
        merged.messages,
        vec!["Hallo Frank! Deine Rolle ist Springer.", "Hallo Sabine! Deine Rolle ist Bar."]
    );
    assert_eq!(merged.truncated_to, None);
}

#[test]
fn shortest_template_column_wins() {
    let merged = fill_template(
        "<name>/<role>",
        &[
            ("<name>", vec!["Frank".into(), "Sabine".into(), "Klara".into()]),
            ("<role>", vec!["Bar".into()]),
        ],
    );
    assert_eq!(merged.messages, vec!["Frank/Bar"]);
    assert_eq!(merged.truncated_to, Some(1));
}

#[test]
fn notices_list_distinct_roles() {
    let mut by_person = BTreeMap::new();
    by_person.insert(
        PersonName::new("Paul"),
        vec![
            Interval {
                start: at("2024-06-01T18:00:00Z"),
                end: at("2024-06-01T20:00:00Z"),
                category: "Bar".into(),
            },
            Interval {
                start: at("2024-06-01T20:00:00Z"),
                end: at("2024-06-01T22:00:00Z"),
                category: "Bar".into(),
            },
        ],
    );
    let notices = prepare_notices("<name>: <role>", &by_person);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].content, "Paul: Bar");

    let dir = tempdir().unwrap();
    let written = write_notices(dir.path(), &notices).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "Paul: Bar");
}
