use super::{AllocError, Conflict, ConflictKind};
use crate::model::{Assignment, PersonName, SlotCapacity, SlotId};
use std::collections::BTreeMap;

/// Vérifie une affectation (éventuellement éditée à la main) contre les capacités.
pub fn check_assignment(assignment: &Assignment, capacities: &[SlotCapacity]) -> Vec<Conflict> {
    let mut out = Vec::new();

    for entry in &assignment.slots {
        match capacities.iter().find(|c| c.slot == entry.slot) {
            None => out.push(Conflict {
                kind: ConflictKind::UnknownSlot,
                person: None,
                slot_a: entry.slot.clone(),
                slot_b: None,
            }),
            Some(cap) if entry.people.len() > cap.capacity as usize => out.push(Conflict {
                kind: ConflictKind::OverCapacity,
                person: None,
                slot_a: entry.slot.clone(),
                slot_b: None,
            }),
            Some(_) => {}
        }
    }

    let mut by_person: BTreeMap<&PersonName, Vec<&SlotId>> = BTreeMap::new();
    for entry in &assignment.slots {
        for person in &entry.people {
            by_person.entry(person).or_default().push(&entry.slot);
        }
    }

    for (person, mut slots) in by_person {
        slots.sort_by_key(|s| s.span);
        for (idx, a) in slots.iter().enumerate() {
            for b in slots.iter().skip(idx + 1) {
                let kind = if a.span == b.span {
                    ConflictKind::DoubleBooking
                } else if a.span.overlaps(&b.span) {
                    ConflictKind::Overlap
                } else {
                    continue;
                };
                out.push(Conflict {
                    kind,
                    person: Some(person.clone()),
                    slot_a: (*a).clone(),
                    slot_b: Some((*b).clone()),
                });
            }
        }
    }

    out
}

/// Variante stricte : erreur dès qu'un conflit bloquant existe.
///
/// Un chevauchement partiel (`Overlap`) n'est pas bloquant : l'allocateur ne
/// retire que les préférences de même intervalle.
pub fn ensure_consistent(
    assignment: &Assignment,
    capacities: &[SlotCapacity],
) -> Result<(), AllocError> {
    let blocking = check_assignment(assignment, capacities)
        .iter()
        .filter(|c| c.kind.is_blocking())
        .count();
    if blocking == 0 {
        Ok(())
    } else {
        Err(AllocError::Inconsistent(blocking))
    }
}
