#![forbid(unsafe_code)]
use chrono::{TimeZone, Utc};
use shiftmatch::{
    model::{parse_timestamp, SlotAssignment},
    AllocateOptions, AllocationOutcome, AllocationReport, Allocator, CalendarConfig, EventConfig,
    JsonStorage, PersonName, SlotCapacity, SlotId, Storage, TieBreak, Timespan,
};
use std::path::PathBuf;
use tempfile::tempdir;

fn span(a: &str, b: &str) -> Timespan {
    Timespan::new(parse_timestamp(a).unwrap(), parse_timestamp(b).unwrap()).unwrap()
}

fn stamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 30, 8, 0, 0).unwrap()
}

fn report(people: &[&str]) -> AllocationReport {
    let slot = SlotId::new("Bar", span("2024-06-01T18:00:00+02:00", "2024-06-01T20:00:00+02:00"));
    let mut outcome = AllocationOutcome::default();
    outcome.assignment.slots.push(SlotAssignment {
        slot: slot.clone(),
        people: people.iter().map(PersonName::new).collect(),
    });
    AllocationReport {
        generated_at: stamp(),
        options: AllocateOptions::default(),
        capacities: vec![SlotCapacity::new(slot, 1)],
        outcome,
    }
}

#[test]
fn save_then_load() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("report.json")).unwrap();
    let original = report(&["anna"]);
    storage.save(&original).unwrap();
    assert_eq!(storage.load().unwrap(), original);
}

#[test]
fn over_capacity_report_is_rejected_but_inspectable() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("report.json")).unwrap();
    storage.save(&report(&["anna", "ben"])).unwrap();
    assert!(storage.load().is_err());
    assert_eq!(storage.load_unchecked().unwrap().outcome.assignment.slots[0].people.len(), 2);
}

#[test]
fn allocated_overlapping_slots_survive_a_reload() {
    let bar = SlotId::new("Bar", span("2024-06-01T18:00:00+02:00", "2024-06-01T20:00:00+02:00"));
    let gate = SlotId::new("Gate", span("2024-06-01T19:00:00+02:00", "2024-06-01T21:00:00+02:00"));
    let capacities = vec![SlotCapacity::new(bar.clone(), 1), SlotCapacity::new(gate.clone(), 1)];
    let prefs = vec![(PersonName::new("alice"), vec![bar, gate])];
    let outcome = Allocator::new(capacities.clone(), prefs).run(AllocateOptions::default());
    assert_eq!(outcome.assignment.slots_of(&PersonName::new("alice")).count(), 2);

    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("report.json")).unwrap();
    let original = AllocationReport {
        generated_at: stamp(),
        options: AllocateOptions::default(),
        capacities,
        outcome,
    };
    storage.save(&original).unwrap();
    assert_eq!(storage.load().unwrap(), original);
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let config: EventConfig =
        serde_json::from_str(r#"{ "tie_break": "fewest-assignments" }"#).unwrap();
    assert_eq!(config.tie_break, TieBreak::FewestAssignments);
    assert_eq!(config.calendar, CalendarConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn empty_event_name_is_rejected() {
    let mut config = EventConfig::default();
    config.calendar.event_name = "  ".into();
    assert!(config.validate().is_err());

    let dir = tempdir().unwrap();
    assert!(config.save(dir.path().join("event.json")).is_err());
}

#[test]
fn config_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("event.json");
    let config = EventConfig {
        calendar: CalendarConfig {
            calendar_name: "Sommerfest".into(),
            event_name: "Schicht".into(),
            description: String::new(),
            location: "Main Gate".into(),
        },
        tie_break: TieBreak::FewestAssignments,
        message_template: Some(PathBuf::from("mail.txt")),
    };
    config.save(&path).unwrap();

    let loaded = EventConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.allocate_options().tie_break, TieBreak::FewestAssignments);
}
