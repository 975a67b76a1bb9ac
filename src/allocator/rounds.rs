use super::{util, AllocateOptions, AllocationOutcome, Allocator, Shortfall};
use crate::model::{Assignment, SlotAssignment};

/// Allocation gloutonne par tours.
///
/// À chaque tour, les créneaux sont visités par capacité d'origine
/// décroissante ; chacun prend au plus une personne (celle qui le classe le
/// plus haut). La personne retenue perd toutes ses préférences portant sur
/// le même intervalle. Un tour sans aucune affectation est un point fixe :
/// le run s'arrête.
pub(super) fn run(allocator: Allocator, opts: AllocateOptions) -> AllocationOutcome {
    let Allocator {
        mut slots,
        mut people,
        warnings,
    } = allocator;

    let order = util::visitation_order(&slots);
    let mut rounds = 0u32;

    while util::has_free_capacity(&slots) && util::has_pending_preferences(&people) {
        rounds += 1;
        let mut progressed = false;

        for &slot_index in &order {
            let state = &mut slots[slot_index];
            if state.remaining == 0 {
                continue;
            }
            let Some(winner) = util::pick_candidate(&people, &state.slot, opts.tie_break) else {
                continue;
            };

            let person = &mut people[winner];
            state.assigned.push(person.name.clone());
            state.remaining -= 1;
            person.held += 1;

            let span = state.slot.span;
            person.prefs.retain(|s| s.span != span);
            progressed = true;

            tracing::debug!(
                round = rounds,
                slot = %state.slot,
                person = %person.name,
                remaining = state.remaining,
                "slot filled"
            );
        }

        if !progressed {
            tracing::debug!(round = rounds, "no candidate left for any open slot");
            break;
        }
    }

    let shortfalls: Vec<Shortfall> = slots
        .iter()
        .filter(|s| s.remaining > 0)
        .map(|s| Shortfall {
            slot: s.slot.clone(),
            capacity: s.capacity,
            filled: s.capacity - s.remaining,
        })
        .collect();
    for shortfall in &shortfalls {
        tracing::warn!(
            slot = %shortfall.slot,
            capacity = shortfall.capacity,
            filled = shortfall.filled,
            "slot under-filled"
        );
    }

    let unassigned = people
        .iter()
        .filter(|p| p.held == 0)
        .map(|p| p.name.clone())
        .collect();

    let assignment = Assignment {
        slots: slots
            .into_iter()
            .map(|s| SlotAssignment {
                slot: s.slot,
                people: s.assigned,
            })
            .collect(),
    };

    AllocationOutcome {
        assignment,
        shortfalls,
        unassigned,
        warnings,
        rounds,
    }
}
