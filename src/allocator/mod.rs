mod check;
mod rounds;
mod types;
mod util;

pub use check::{check_assignment, ensure_consistent};
pub use types::{
    AllocError, AllocateOptions, AllocationOutcome, Conflict, ConflictKind, Shortfall, TieBreak,
    Warning,
};

use crate::model::{CompactPreference, PersonName, SlotCapacity, SlotId};
use crate::preference;
use std::collections::HashSet;
use util::{Candidate, SlotState};

/// Allocator : possède ses capacités et préférences le temps d'un run.
///
/// Les entrées sont prises par valeur et consommées par [`Allocator::run`] ;
/// chaque run travaille sur sa propre copie.
pub struct Allocator {
    slots: Vec<SlotState>,
    people: Vec<Candidate>,
    warnings: Vec<Warning>,
}

impl Allocator {
    /// Prépare un run à partir de préférences déjà développées.
    ///
    /// Créneaux et personnes en double : le premier gagne, les suivants
    /// sont ignorés et signalés.
    pub fn new(capacities: Vec<SlotCapacity>, preferences: Vec<(PersonName, Vec<SlotId>)>) -> Self {
        let mut warnings = Vec::new();

        let mut seen_slots = HashSet::new();
        let mut slots = Vec::with_capacity(capacities.len());
        for cap in capacities {
            if !seen_slots.insert(cap.slot.clone()) {
                tracing::warn!(slot = %cap.slot, "duplicate slot ignored");
                warnings.push(Warning::DuplicateSlot { slot: cap.slot });
                continue;
            }
            slots.push(SlotState {
                remaining: cap.capacity,
                capacity: cap.capacity,
                slot: cap.slot,
                assigned: Vec::new(),
            });
        }

        let mut seen_people = HashSet::new();
        let mut people = Vec::with_capacity(preferences.len());
        for (name, prefs) in preferences {
            if !seen_people.insert(name.clone()) {
                tracing::warn!(person = %name, "duplicate person ignored");
                warnings.push(Warning::DuplicatePerson { person: name });
                continue;
            }
            for slot in prefs.iter().filter(|s| !seen_slots.contains(*s)) {
                tracing::warn!(person = %name, slot = %slot, "preference names an unknown slot");
                warnings.push(Warning::UnknownSlot {
                    person: name.clone(),
                    slot: slot.clone(),
                });
            }
            people.push(Candidate {
                name,
                prefs,
                held: 0,
            });
        }

        Self {
            slots,
            people,
            warnings,
        }
    }

    /// Prépare un run à partir de préférences compactes (développées ici).
    pub fn from_compact(
        capacities: Vec<SlotCapacity>,
        preferences: Vec<(PersonName, CompactPreference)>,
    ) -> Self {
        let expanded = preference::expand_all(preferences);
        let mut allocator = Self::new(capacities, expanded.people);
        let mut warnings: Vec<Warning> = expanded.skipped.into_iter().map(Warning::from).collect();
        warnings.append(&mut allocator.warnings);
        allocator.warnings = warnings;
        allocator
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Exécute l'allocation et consomme l'état.
    pub fn run(self, opts: AllocateOptions) -> AllocationOutcome {
        rounds::run(self, opts)
    }
}
