#![forbid(unsafe_code)]
//! Shiftmatch — affectation de créneaux par préférences classées.
//!
//! - Développement des préférences compactes (intervalles × catégories).
//! - Allocation gloutonne par tours, capacités respectées.
//! - Consolidation des services contigus, table maître par catégorie.
//! - Adaptateurs CSV / iCalendar / messages en dehors du cœur.
//! - Horodatages avec offset explicite, jamais convertis dans le cœur.

pub mod allocator;
pub mod calendar;
pub mod config;
pub mod consolidate;
pub mod io;
pub mod model;
pub mod notification;
pub mod preference;
pub mod projector;
pub mod storage;

pub use allocator::{
    check_assignment, AllocateOptions, AllocationOutcome, Allocator, Conflict, ConflictKind,
    Shortfall, TieBreak, Warning,
};
pub use config::{CalendarConfig, EventConfig};
pub use consolidate::{consolidate, Consolidated};
pub use model::{
    Assignment, CompactPreference, Interval, PersonName, ShiftRecord, SlotCapacity, SlotId,
    Timespan, Timestamp,
};
pub use notification::{fill_template, prepare_notices, Notice};
pub use preference::expand;
pub use projector::{master_table, per_person, shift_records, MasterRow};
pub use storage::{AllocationReport, JsonStorage, Storage};
