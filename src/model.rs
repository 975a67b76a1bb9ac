use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Horodatage tel que fourni (offset explicite conservé, pas de conversion).
pub type Timestamp = DateTime<FixedOffset>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid timespan: end must be strictly after start")]
    InvalidTimespan,
    #[error("malformed preference for {person}: {reason}")]
    MalformedPreference { person: String, reason: &'static str },
}

/// Identifiant fort pour une personne (nom unique dans un run).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Intervalle [start, end), `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timespan {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Timespan {
    /// Crée un intervalle en validant que `end > start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ModelError> {
        if end <= start {
            return Err(ModelError::InvalidTimespan);
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &Timespan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Créneau : (catégorie, intervalle). Plusieurs créneaux peuvent partager une catégorie.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId {
    pub category: String,
    pub span: Timespan,
}

impl SlotId {
    pub fn new<C: Into<String>>(category: C, span: Timespan) -> Self {
        Self {
            category: category.into(),
            span,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} → {}]",
            self.category,
            self.span.start.to_rfc3339(),
            self.span.end.to_rfc3339()
        )
    }
}

/// Créneau avec sa capacité d'origine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapacity {
    pub slot: SlotId,
    pub capacity: u32,
}

impl SlotCapacity {
    pub fn new(slot: SlotId, capacity: u32) -> Self {
        Self { slot, capacity }
    }
}

/// Préférence compacte : catégories classées × intervalles classés.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompactPreference {
    pub categories: Vec<String>,
    pub timespans: Vec<Timespan>,
}

impl CompactPreference {
    pub fn new(categories: Vec<String>, timespans: Vec<Timespan>) -> Self {
        Self {
            categories,
            timespans,
        }
    }

    pub fn validate(&self, person: &PersonName) -> Result<(), ModelError> {
        if self.categories.is_empty() {
            return Err(ModelError::MalformedPreference {
                person: person.as_str().to_string(),
                reason: "no category",
            });
        }
        if self.timespans.is_empty() {
            return Err(ModelError::MalformedPreference {
                person: person.as_str().to_string(),
                reason: "no timespan",
            });
        }
        Ok(())
    }
}

/// Affectations par créneau, dans l'ordre de la liste de capacités.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assignment {
    pub slots: Vec<SlotAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: SlotId,
    /// Ordre d'insertion = ordre de remplissage.
    pub people: Vec<PersonName>,
}

impl Assignment {
    pub fn get(&self, slot: &SlotId) -> Option<&[PersonName]> {
        self.slots
            .iter()
            .find(|s| &s.slot == slot)
            .map(|s| s.people.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotId, &[PersonName])> {
        self.slots.iter().map(|s| (&s.slot, s.people.as_slice()))
    }

    /// Créneaux tenus par une personne, dans l'ordre des créneaux.
    pub fn slots_of<'a>(&'a self, person: &'a PersonName) -> impl Iterator<Item = &'a SlotId> + 'a {
        self.slots
            .iter()
            .filter(move |s| s.people.contains(person))
            .map(|s| &s.slot)
    }
}

/// Unité de travail confirmée et contiguë.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub person: PersonName,
    pub start: Timestamp,
    pub end: Timestamp,
    pub category: String,
}

/// Intervalle consolidé d'une personne.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
    pub category: String,
}

/// Parse un horodatage ISO-8601 / RFC3339 avec offset explicite.
///
/// Les secondes sont optionnelles (`2023-07-16T19:20+01:00`).
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).or_else(|err| {
        ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"]
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
            .ok_or(err)
    })
}
