#![forbid(unsafe_code)]
use shiftmatch::{
    consolidate,
    io::{import_timeline_csv, load_event_dir, Presence},
    AllocateOptions, Allocator, PersonName, TieBreak,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CAPACITIES: &str = "\
category,start,end,capacity
Bar,2024-06-01T18:00:00+02:00,2024-06-01T20:00:00+02:00,1
Gate,2024-06-01T18:00:00+02:00,2024-06-01T20:00:00+02:00,2
Bar,2024-06-01T20:00:00+02:00,2024-06-01T22:00:00+02:00,1
";

const PREFERENCES: &str = "\
name,categories,timespans
anna,Bar;Gate,2024-06-01T18:00:00+02:00/2024-06-01T20:00:00+02:00;2024-06-01T20:00:00+02:00/2024-06-01T22:00:00+02:00
ben,Bar,2024-06-01T18:00:00+02:00/2024-06-01T20:00:00+02:00
ghost,,2024-06-01T18:00:00+02:00/2024-06-01T20:00:00+02:00
";

fn write_required(dir: &Path) {
    fs::write(dir.join("capacities.csv"), CAPACITIES).unwrap();
    fs::write(dir.join("preferences.csv"), PREFERENCES).unwrap();
}

#[test]
fn optional_inputs_are_reported_missing() {
    let dir = tempdir().unwrap();
    write_required(dir.path());

    let inputs = load_event_dir(dir.path()).unwrap();
    assert_eq!(inputs.capacities.len(), 3);
    assert_eq!(inputs.preferences.len(), 3);
    assert!(matches!(inputs.timeline, Presence::Missing(_)));
    assert!(matches!(inputs.message, Presence::Missing(_)));
    assert!(!inputs.config.is_found());
}

#[test]
fn optional_inputs_are_picked_up_when_present() {
    let dir = tempdir().unwrap();
    write_required(dir.path());
    fs::write(dir.path().join("message.txt"), "Hi <name>").unwrap();
    fs::write(
        dir.path().join("event.json"),
        r#"{ "tie_break": "fewest-assignments", "calendar": { "calendar_name": "Fest", "event_name": "Shift" } }"#,
    )
    .unwrap();

    let inputs = load_event_dir(dir.path()).unwrap();
    assert_eq!(inputs.message.found().as_deref(), Some("Hi <name>"));
    let config = inputs.config.found().unwrap();
    assert_eq!(config.tie_break, TieBreak::FewestAssignments);
    assert_eq!(config.calendar.calendar_name, "Fest");
}

#[test]
fn broken_optional_file_is_an_error() {
    let dir = tempdir().unwrap();
    write_required(dir.path());
    fs::write(dir.path().join("event.json"), "{ not json").unwrap();
    assert!(load_event_dir(dir.path()).is_err());
}

#[test]
fn missing_required_file_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("capacities.csv"), CAPACITIES).unwrap();
    assert!(load_event_dir(dir.path()).is_err());
}

#[test]
fn imported_event_allocates_and_skips_malformed_preference() {
    let dir = tempdir().unwrap();
    write_required(dir.path());
    let inputs = load_event_dir(dir.path()).unwrap();

    let outcome =
        Allocator::from_compact(inputs.capacities, inputs.preferences).run(AllocateOptions::default());
    // ghost sans catégorie, et anna cite Gate à 20h qui n'existe pas
    assert_eq!(outcome.warnings.len(), 2);
    assert!(outcome.unassigned.contains(&PersonName::new("ghost")));

    let held: usize = outcome.assignment.iter().map(|(_, p)| p.len()).sum();
    assert_eq!(held, 3);
}

#[test]
fn timeline_grid_becomes_consolidated_intervals() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("timeline.csv");
    fs::write(
        &path,
        "\
time,Bar,Gate
2023-07-16T19:00+01:00,Alice,Bob
2023-07-16T20:00+01:00,Alice,
2023-07-16T21:00+01:00,Bob,Alice
2023-07-16T22:00+01:00
",
    )
    .unwrap();

    let records = import_timeline_csv(&path).unwrap();
    assert_eq!(records.len(), 5);

    let merged = consolidate(&records);
    let alice = merged.get(&PersonName::new("Alice")).unwrap();
    assert_eq!(alice.len(), 2);
    assert_eq!(alice[0].category, "Bar");
    assert_eq!(alice[0].end, alice[1].start);
    assert_eq!(alice[1].category, "Gate");

    let bob = merged.get(&PersonName::new("Bob")).unwrap();
    assert_eq!(bob.len(), 2);
}

#[test]
fn same_row_in_two_columns_still_merges_per_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("timeline.csv");
    fs::write(
        &path,
        "\
time,Bar,Gate
2023-07-16T19:00+01:00,Alice,Alice
2023-07-16T20:00+01:00,Alice,
2023-07-16T21:00+01:00,Carl
",
    )
    .unwrap();

    let records = import_timeline_csv(&path).unwrap();
    // Carl, sur la dernière ligne, n'a pas d'heure de fin
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.person.as_str() == "Alice"));

    let merged = consolidate(&records);
    let alice = merged.get(&PersonName::new("Alice")).unwrap();
    assert_eq!(alice.len(), 2);
    assert_eq!(alice[0].category, "Bar");
    assert_eq!(alice[0].end - alice[0].start, chrono::Duration::hours(2));
    assert_eq!(alice[1].category, "Gate");
}
