//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Node of the per-agent behavior state machine.
///
/// There is no terminal state; an agent cycles through these until it is
/// removed from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Standing still, scanning for others.
    Idle,
    /// Roaming around the spawn anchor.
    Wandering,
    /// Stopped and watching a target.
    Alert,
    /// Pursuing a target or approaching a corpse.
    Hunting,
    /// Striking a target in melee range.
    Attacking,
    /// Running away from a target.
    Fleeing,
    /// Consuming a corpse (or digesting a kill).
    Eating,
    /// Walking slowly until stamina is full again.
    Resting,
}

impl BehaviorState {
    /// Whether this state permits running at sprint speed.
    pub const fn allows_sprint(self) -> bool {
        matches!(self, Self::Hunting | Self::Fleeing)
    }
}

impl core::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Wandering => "wandering",
            Self::Alert => "alert",
            Self::Hunting => "hunting",
            Self::Attacking => "attacking",
            Self::Fleeing => "fleeing",
            Self::Eating => "eating",
            Self::Resting => "resting",
        };
        f.write_str(name)
    }
}

/// Named band of the hunger pool.
///
/// Hunger runs from 100 (full) down to 0 (empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HungerStatus {
    /// Above 75.
    Satiated,
    /// Above 50.
    Normal,
    /// Above 25.
    Hungry,
    /// 25 or below.
    Starving,
}

impl HungerStatus {
    /// Whether the agent is hungry enough to risk a same-level fight or
    /// go looking for a corpse.
    pub const fn is_hungry(self) -> bool {
        matches!(self, Self::Hungry | Self::Starving)
    }
}

/// Kind of an entity reported by perception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// An AI-controlled agent.
    Agent,
    /// The player.
    Player,
    /// A corpse.
    Corpse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hunting_and_fleeing_allow_sprint() {
        let all = [
            BehaviorState::Idle,
            BehaviorState::Wandering,
            BehaviorState::Alert,
            BehaviorState::Hunting,
            BehaviorState::Attacking,
            BehaviorState::Fleeing,
            BehaviorState::Eating,
            BehaviorState::Resting,
        ];
        let sprinting: Vec<_> = all.into_iter().filter(|s| s.allows_sprint()).collect();
        assert_eq!(sprinting, vec![BehaviorState::Hunting, BehaviorState::Fleeing]);
    }

    #[test]
    fn hungry_and_starving_count_as_hungry() {
        assert!(!HungerStatus::Satiated.is_hungry());
        assert!(!HungerStatus::Normal.is_hungry());
        assert!(HungerStatus::Hungry.is_hungry());
        assert!(HungerStatus::Starving.is_hungry());
    }
}
