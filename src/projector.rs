//! Projections d'une affectation : vue par personne et table maître par catégorie.
//!
//! Aucune fusion ici : une ligne par créneau.

use crate::model::{Assignment, Interval, PersonName, ShiftRecord, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ligne de la table maître.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRow {
    pub start: Timestamp,
    pub end: Timestamp,
    pub staff: Vec<PersonName>,
}

impl MasterRow {
    /// Noms joints par virgule, dans l'ordre d'affectation.
    pub fn staff_label(&self) -> String {
        self.staff
            .iter()
            .map(PersonName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Vue par personne : un intervalle par (créneau, personne), dans l'ordre des créneaux.
pub fn per_person(assignment: &Assignment) -> BTreeMap<PersonName, Vec<Interval>> {
    let mut out: BTreeMap<PersonName, Vec<Interval>> = BTreeMap::new();
    for (slot, people) in assignment.iter() {
        for person in people {
            out.entry(person.clone()).or_default().push(Interval {
                start: slot.span.start,
                end: slot.span.end,
                category: slot.category.clone(),
            });
        }
    }
    out
}

/// Table maître : une table par catégorie, lignes triées par début.
pub fn master_table(assignment: &Assignment) -> BTreeMap<String, Vec<MasterRow>> {
    let mut out: BTreeMap<String, Vec<MasterRow>> = BTreeMap::new();
    for (slot, people) in assignment.iter() {
        out.entry(slot.category.clone()).or_default().push(MasterRow {
            start: slot.span.start,
            end: slot.span.end,
            staff: people.to_vec(),
        });
    }
    for rows in out.values_mut() {
        rows.sort_by_key(|r| r.start);
    }
    out
}

/// Enregistrements par personne triés chronologiquement, prêts à consolider.
pub fn shift_records(assignment: &Assignment) -> Vec<ShiftRecord> {
    per_person(assignment)
        .into_iter()
        .flat_map(|(person, mut intervals)| {
            intervals.sort_by_key(|i| (i.start, i.end));
            intervals.into_iter().map(move |i| ShiftRecord {
                person: person.clone(),
                start: i.start,
                end: i.end,
                category: i.category,
            })
        })
        .collect()
}
