//! Expansion des préférences compactes en liste ordonnée de créneaux.
//!
//! Intervalles en boucle externe, catégories en boucle interne : le choix
//! de l'horaire domine le choix de la catégorie.

use crate::model::{CompactPreference, ModelError, PersonName, SlotId};

/// Produit cartésien ordonné (intervalle, puis catégorie).
pub fn expand(pref: &CompactPreference) -> Vec<SlotId> {
    pref.timespans
        .iter()
        .flat_map(|span| {
            pref.categories
                .iter()
                .map(move |category| SlotId::new(category.clone(), *span))
        })
        .collect()
}

/// Préférences développées d'un run, dans l'ordre d'entrée des personnes.
#[derive(Debug, Clone, Default)]
pub struct ExpandedPreferences {
    pub people: Vec<(PersonName, Vec<SlotId>)>,
    pub skipped: Vec<ModelError>,
}

/// Développe toutes les préférences ; une préférence malformée est
/// ignorée (la personne n'a alors aucune préférence) et rapportée.
pub fn expand_all<I>(prefs: I) -> ExpandedPreferences
where
    I: IntoIterator<Item = (PersonName, CompactPreference)>,
{
    let mut out = ExpandedPreferences::default();
    for (person, pref) in prefs {
        match pref.validate(&person) {
            Ok(()) => {
                let list = expand(&pref);
                out.people.push((person, list));
            }
            Err(err) => {
                tracing::warn!(person = %person, error = %err, "skipping malformed preference");
                out.people.push((person, Vec::new()));
                out.skipped.push(err);
            }
        }
    }
    out
}
