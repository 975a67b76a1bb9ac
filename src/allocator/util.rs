use super::TieBreak;
use crate::model::{PersonName, SlotId};

pub(super) struct SlotState {
    pub slot: SlotId,
    pub capacity: u32,
    pub remaining: u32,
    pub assigned: Vec<PersonName>,
}

pub(super) struct Candidate {
    pub name: PersonName,
    pub prefs: Vec<SlotId>,
    pub held: u32,
}

/// Capacité d'origine décroissante ; tri stable donc ordre d'entrée à égalité.
pub(super) fn visitation_order(slots: &[SlotState]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| slots[b].capacity.cmp(&slots[a].capacity));
    order
}

/// Index du candidat retenu pour `slot` : rang minimal, premier atteint.
pub(super) fn pick_candidate(
    people: &[Candidate],
    slot: &SlotId,
    tie_break: TieBreak,
) -> Option<usize> {
    let ranked = people.iter().enumerate().filter_map(|(idx, person)| {
        person
            .prefs
            .iter()
            .position(|s| s == slot)
            .map(|rank| (idx, rank, person.held))
    });

    // min_by_key garde le premier minimum rencontré
    let best = match tie_break {
        TieBreak::InputOrder => ranked.min_by_key(|&(_, rank, _)| rank),
        TieBreak::FewestAssignments => ranked.min_by_key(|&(_, rank, held)| (rank, held)),
    };
    best.map(|(idx, _, _)| idx)
}

pub(super) fn has_free_capacity(slots: &[SlotState]) -> bool {
    slots.iter().any(|s| s.remaining > 0)
}

pub(super) fn has_pending_preferences(people: &[Candidate]) -> bool {
    people.iter().any(|p| !p.prefs.is_empty())
}
