use crate::model::{Assignment, ModelError, PersonName, SlotId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Départage entre candidats de même rang.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Premier candidat rencontré dans l'ordre d'entrée.
    #[default]
    InputOrder,
    /// Moins de créneaux obtenus jusque-là, puis ordre d'entrée.
    FewestAssignments,
}

/// Options d'allocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateOptions {
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// Donnée ignorée pendant la préparation (jamais fatal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    DuplicateSlot { slot: SlotId },
    DuplicatePerson { person: PersonName },
    MalformedPreference { message: String },
    UnknownSlot { person: PersonName, slot: SlotId },
}

impl From<ModelError> for Warning {
    fn from(err: ModelError) -> Self {
        Warning::MalformedPreference {
            message: err.to_string(),
        }
    }
}

/// Créneau resté sous sa capacité en fin de run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub slot: SlotId,
    pub capacity: u32,
    pub filled: u32,
}

impl Shortfall {
    pub fn missing(&self) -> u32 {
        self.capacity - self.filled
    }
}

/// Résultat d'un run d'allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub assignment: Assignment,
    pub shortfalls: Vec<Shortfall>,
    pub unassigned: Vec<PersonName>,
    pub warnings: Vec<Warning>,
    pub rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    OverCapacity,
    UnknownSlot,
    /// Même personne, même intervalle sur deux créneaux.
    DoubleBooking,
    /// Même personne, intervalles qui se chevauchent sans être égaux.
    Overlap,
}

impl ConflictKind {
    /// Conflits que l'allocateur ne peut jamais produire.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, ConflictKind::Overlap)
    }
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub person: Option<PersonName>,
    pub slot_a: SlotId,
    pub slot_b: Option<SlotId>,
}

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("assignment is inconsistent with its capacities: {0} conflict(s)")]
    Inconsistent(usize),
}
