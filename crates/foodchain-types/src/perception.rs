//! Records returned by the spatial query that feeds agent perception.

use serde::{Deserialize, Serialize};

use crate::enums::EntityKind;
use crate::geometry::Vec2;
use crate::ids::{ActorId, CorpseId, EntityRef};

/// One entity seen by a spatial query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// What was seen.
    pub entity: EntityRef,
    /// Level of the entity (for corpses, the level of the creature that died).
    pub level: u32,
    /// Where it was at query time.
    pub position: Vec2,
}

impl Sighting {
    /// The kind of entity this sighting refers to.
    pub const fn kind(&self) -> EntityKind {
        match self.entity {
            EntityRef::Actor(ActorId::Agent(_)) => EntityKind::Agent,
            EntityRef::Actor(ActorId::Player(_)) => EntityKind::Player,
            EntityRef::Corpse(_) => EntityKind::Corpse,
        }
    }

    /// The actor handle, if this sighting is an agent or the player.
    pub const fn actor(&self) -> Option<ActorId> {
        match self.entity {
            EntityRef::Actor(id) => Some(id),
            EntityRef::Corpse(_) => None,
        }
    }

    /// The corpse handle, if this sighting is a corpse.
    pub const fn corpse(&self) -> Option<CorpseId> {
        match self.entity {
            EntityRef::Corpse(id) => Some(id),
            EntityRef::Actor(_) => None,
        }
    }
}

/// A live lookup of an actor through a direct handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    /// The actor's handle.
    pub id: ActorId,
    /// The actor's level.
    pub level: u32,
    /// Current position.
    pub position: Vec2,
    /// Current health.
    pub health: u32,
}

impl ActorView {
    /// Whether the actor's health has reached zero.
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AgentId, PlayerId};

    #[test]
    fn kind_follows_entity_ref() {
        let agent = Sighting {
            entity: EntityRef::Actor(ActorId::Agent(AgentId::new(1))),
            level: 2,
            position: Vec2::ZERO,
        };
        let player = Sighting {
            entity: EntityRef::Actor(ActorId::Player(PlayerId::new(1))),
            ..agent
        };
        let corpse = Sighting {
            entity: EntityRef::Corpse(CorpseId::new(9)),
            ..agent
        };
        assert_eq!(agent.kind(), EntityKind::Agent);
        assert_eq!(player.kind(), EntityKind::Player);
        assert_eq!(corpse.kind(), EntityKind::Corpse);
        assert_eq!(corpse.corpse(), Some(CorpseId::new(9)));
        assert!(corpse.actor().is_none());
    }
}
