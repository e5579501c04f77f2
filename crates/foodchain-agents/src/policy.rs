//! The level-comparison policy.
//!
//! Given two levels and the deciding agent's hunger, pick how to react to
//! another actor:
//!
//! | own - other | reaction                                         |
//! |-------------|--------------------------------------------------|
//! | > 1         | attack if within striking distance, else observe |
//! | 1           | pursue                                           |
//! | 0           | pursue when hungry or starving, else flee        |
//! | < 0         | flee                                             |
//!
//! The asymmetry is what keeps the food chain stable without any global
//! coordination: weaker neighbours are eaten, equals are avoided unless
//! hunger forces the issue, and stronger ones are always escaped.

use std::cmp::Ordering;

use foodchain_types::{BehaviorState, HungerStatus};

/// What an agent decides to do about another actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Strike immediately.
    Attack,
    /// Stop and watch without pursuing.
    Observe,
    /// Chase the other actor.
    Pursue,
    /// Run away.
    Flee,
}

impl Reaction {
    /// The state an agent enters to carry out this reaction.
    pub const fn state(self) -> BehaviorState {
        match self {
            Self::Attack => BehaviorState::Attacking,
            Self::Observe => BehaviorState::Alert,
            Self::Pursue => BehaviorState::Hunting,
            Self::Flee => BehaviorState::Fleeing,
        }
    }
}

/// Decide how an agent of level `own` reacts to an actor of level `other`.
///
/// `within_strike` is whether the other actor is inside the opportunistic
/// attack distance; it only matters when the agent outclasses it by more
/// than one level.
pub fn compare_levels(own: u32, other: u32, hunger: HungerStatus, within_strike: bool) -> Reaction {
    match own.cmp(&other) {
        Ordering::Greater if own.abs_diff(other) > 1 => {
            if within_strike {
                Reaction::Attack
            } else {
                Reaction::Observe
            }
        }
        Ordering::Greater => Reaction::Pursue,
        Ordering::Equal if hunger.is_hungry() => Reaction::Pursue,
        Ordering::Equal | Ordering::Less => Reaction::Flee,
    }
}
