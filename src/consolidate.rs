//! Consolidation des enregistrements de service en intervalles contigus.
//!
//! Les enregistrements d'une même personne doivent arriver en ordre
//! chronologique ; aucun tri n'est fait ici.

use crate::model::{Interval, PersonName, ShiftRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Intervalles consolidés par personne.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consolidated {
    pub by_person: BTreeMap<PersonName, Vec<Interval>>,
}

impl Consolidated {
    pub fn get(&self, person: &PersonName) -> Option<&[Interval]> {
        self.by_person.get(person).map(Vec::as_slice)
    }

    /// Aplati en enregistrements (ordre par personne conservé).
    pub fn records(&self) -> Vec<ShiftRecord> {
        self.by_person
            .iter()
            .flat_map(|(person, intervals)| {
                intervals.iter().map(move |i| ShiftRecord {
                    person: person.clone(),
                    start: i.start,
                    end: i.end,
                    category: i.category.clone(),
                })
            })
            .collect()
    }
}

/// Fusionne un enregistrement dans l'intervalle précédent de la personne
/// quand `prev.end == rec.start` et que la catégorie est la même.
pub fn consolidate<'a, I>(records: I) -> Consolidated
where
    I: IntoIterator<Item = &'a ShiftRecord>,
{
    let mut by_person: BTreeMap<PersonName, Vec<Interval>> = BTreeMap::new();

    for rec in records {
        let intervals = by_person.entry(rec.person.clone()).or_default();
        match intervals.last_mut() {
            Some(prev) if prev.end == rec.start && prev.category == rec.category => {
                prev.end = rec.end;
            }
            _ => intervals.push(Interval {
                start: rec.start,
                end: rec.end,
                category: rec.category.clone(),
            }),
        }
    }

    Consolidated { by_person }
}
