//! Type-safe identifier wrappers around `u64` arena handles.
//!
//! Every simulated entity has a strongly-typed handle so agents, corpses,
//! and the player cannot be mixed up at compile time. Handles are issued
//! by the world arena from a monotonic counter and are never reused, so a
//! handle that fails a liveness lookup is permanently stale.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw arena index.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner raw value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id! {
    /// Handle of an autonomous creature in the world arena.
    AgentId, "agent"
}

define_id! {
    /// Handle of a corpse in the world arena.
    CorpseId, "corpse"
}

define_id! {
    /// Handle of the player entity.
    PlayerId, "player"
}

/// A living combatant: something that can be targeted, damaged, or hold
/// a corpse claim.
///
/// Agents and the player share this role; corpses never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActorId {
    /// An AI-controlled agent.
    Agent(AgentId),
    /// The player.
    Player(PlayerId),
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Agent(id) => id.fmt(f),
            Self::Player(id) => id.fmt(f),
        }
    }
}

impl From<AgentId> for ActorId {
    fn from(id: AgentId) -> Self {
        Self::Agent(id)
    }
}

impl From<PlayerId> for ActorId {
    fn from(id: PlayerId) -> Self {
        Self::Player(id)
    }
}

/// Any entity perception can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// A living actor (agent or player).
    Actor(ActorId),
    /// A corpse.
    Corpse(CorpseId),
}

impl From<ActorId> for EntityRef {
    fn from(id: ActorId) -> Self {
        Self::Actor(id)
    }
}

impl From<CorpseId> for EntityRef {
    fn from(id: CorpseId) -> Self {
        Self::Corpse(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        assert_eq!(AgentId::new(7).to_string(), "agent#7");
        assert_eq!(CorpseId::new(3).to_string(), "corpse#3");
        assert_eq!(ActorId::from(PlayerId::new(1)).to_string(), "player#1");
    }

    #[test]
    fn actor_ids_of_different_kinds_are_distinct() {
        let agent = ActorId::from(AgentId::new(1));
        let player = ActorId::from(PlayerId::new(1));
        assert_ne!(agent, player);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = EntityRef::Actor(ActorId::Agent(AgentId::new(42)));
        let json = serde_json::to_string(&original).unwrap();
        let restored: EntityRef = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }
}
