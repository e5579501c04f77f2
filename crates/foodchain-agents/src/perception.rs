//! Reduce raw sightings to what the state machine reacts to.
//!
//! The spatial query returns everything in range; an agent only cares
//! about the closest other actor and the closest corpse nobody else is
//! eating.

use foodchain_types::{ActorId, CorpseId, Sighting, Vec2};

/// A sighting with its distance from the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percept {
    /// What was seen.
    pub sighting: Sighting,
    /// Distance from the observer.
    pub distance: f32,
}

/// The result of one perception scan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scan {
    /// Closest agent or player other than the observer.
    pub actor: Option<(ActorId, Percept)>,
    /// Closest corpse that passed the availability filter.
    pub corpse: Option<(CorpseId, Percept)>,
}

impl Scan {
    /// Whether nothing of interest was seen.
    pub const fn is_empty(&self) -> bool {
        self.actor.is_none() && self.corpse.is_none()
    }
}

/// Pick the nearest actor and nearest available corpse.
///
/// `observer` is excluded from the actor candidates. `corpse_available`
/// lets the caller reject corpses that are already claimed by someone else.
pub fn scan(
    origin: Vec2,
    observer: ActorId,
    sightings: &[Sighting],
    mut corpse_available: impl FnMut(CorpseId) -> bool,
) -> Scan {
    let mut out = Scan::default();
    for sighting in sightings {
        let distance = origin.distance(sighting.position);
        if !distance.is_finite() {
            continue;
        }
        let percept = Percept {
            sighting: *sighting,
            distance,
        };
        if let Some(actor) = sighting.actor() {
            if actor == observer {
                continue;
            }
            if out.actor.is_none_or(|(_, best)| distance < best.distance) {
                out.actor = Some((actor, percept));
            }
        } else if let Some(corpse) = sighting.corpse()
            && out.corpse.is_none_or(|(_, best)| distance < best.distance)
            && corpse_available(corpse)
        {
            out.corpse = Some((corpse, percept));
        }
    }
    out
}
