//! Corpses and the exclusive, resumable consumption protocol.
//!
//! A corpse is left behind whenever an agent or the player dies. It holds a
//! fixed heal and currency budget that is paid out progressively to the one
//! actor currently consuming it. The rules:
//!
//! - At most one consumer at a time. A claim by anyone else is rejected
//!   with [`ClaimError::AlreadyClaimed`], never queued.
//! - Progress only advances while claimed and is never rolled back.
//!   Pausing keeps it, so the next claimant (or the same one) resumes.
//! - Payouts are computed from progress at fixed intervals, and flushed on
//!   pause and on completion, so the paid total never outruns progress and
//!   equals the full budget once the corpse is finished.
//! - An unfinished corpse blinks through a warning phase and then expires,
//!   losing whatever budget was never paid.

use foodchain_types::{ActorId, CorpseId, Vec2};

use crate::config::CorpseConfig;

/// Progress at or above `1 - COMPLETE_EPSILON` counts as finished; this
/// absorbs accumulated rounding from many small time steps.
const COMPLETE_EPSILON: f32 = 1e-4;

/// Why a claim on a corpse was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    /// Another actor is already consuming the corpse.
    #[error("{corpse} is already being consumed by {holder}")]
    AlreadyClaimed {
        /// The contested corpse.
        corpse: CorpseId,
        /// The actor holding the claim.
        holder: ActorId,
    },

    /// The corpse has been fully consumed or has expired.
    #[error("{corpse} has nothing left to consume")]
    Depleted {
        /// The exhausted corpse.
        corpse: CorpseId,
    },
}

/// Lifecycle phase of a corpse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpsePhase {
    /// Normal lifetime.
    Fresh,
    /// Final stretch of the lifetime; visibility toggles.
    Warning,
    /// Lifetime elapsed before it was finished. Should be removed.
    Expired,
    /// Fully eaten. Should be removed.
    Consumed,
}

impl CorpsePhase {
    /// Whether the corpse should be removed from the world.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Consumed)
    }
}

/// An amount paid out to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Who receives it.
    pub consumer: ActorId,
    /// Heal granted.
    pub heal: u32,
    /// Currency granted.
    pub currency: u32,
}

/// Outcome of advancing a corpse by one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorpseTick {
    /// Reward paid during this step, if any.
    pub payout: Option<Payout>,
    /// The actor that finished the corpse during this step.
    pub completed_by: Option<ActorId>,
    /// The corpse expired during this step.
    pub expired: bool,
}

/// A depletable reward left by a dead actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpse {
    id: CorpseId,
    source: ActorId,
    level: u32,
    position: Vec2,
    heal_budget: u32,
    currency_budget: u32,
    progress: f32,
    granted_heal: u32,
    granted_currency: u32,
    consumer: Option<ActorId>,
    age: f32,
    since_payout: f32,
    since_blink: f32,
    visible: bool,
    phase: CorpsePhase,
    timing: CorpseConfig,
}

impl Corpse {
    /// Create a fresh, unclaimed corpse.
    pub fn new(
        id: CorpseId,
        source: ActorId,
        level: u32,
        position: Vec2,
        heal_budget: u32,
        currency_budget: u32,
        timing: &CorpseConfig,
    ) -> Self {
        Self {
            id,
            source,
            level,
            position,
            heal_budget,
            currency_budget,
            progress: 0.0,
            granted_heal: 0,
            granted_currency: 0,
            consumer: None,
            age: 0.0,
            since_payout: 0.0,
            since_blink: 0.0,
            visible: true,
            phase: CorpsePhase::Fresh,
            timing: timing.clone(),
        }
    }

    /// Claim the corpse for `by`, or confirm an existing claim by `by`.
    pub fn begin_consuming(&mut self, by: ActorId) -> Result<(), ClaimError> {
        if self.phase.is_terminal() {
            return Err(ClaimError::Depleted { corpse: self.id });
        }
        match self.consumer {
            Some(holder) if holder != by => Err(ClaimError::AlreadyClaimed {
                corpse: self.id,
                holder,
            }),
            Some(_) => Ok(()),
            None => {
                self.consumer = Some(by);
                self.since_payout = 0.0;
                tracing::debug!(corpse = %self.id, consumer = %by, progress = self.progress, "Corpse claimed");
                Ok(())
            }
        }
    }

    /// Release the claim held by `by`, keeping progress.
    ///
    /// Any payout owed for progress made so far is returned so the caller
    /// can deliver it. A call from someone who does not hold the claim is a
    /// no-op.
    pub fn pause_consuming(&mut self, by: ActorId) -> Option<Payout> {
        if self.consumer != Some(by) {
            return None;
        }
        let payout = self.settle(by);
        self.consumer = None;
        tracing::debug!(corpse = %self.id, consumer = %by, progress = self.progress, "Corpse consumption paused");
        payout
    }

    /// Advance by `dt` seconds: age the corpse, accrue progress for the
    /// current consumer and pay out at the configured interval.
    pub fn tick(&mut self, dt: f32) -> CorpseTick {
        let mut out = CorpseTick::default();
        if self.phase.is_terminal() {
            return out;
        }
        let dt = dt.max(0.0);
        self.age += dt;

        if let Some(consumer) = self.consumer {
            let duration = self.timing.consume_duration_secs.max(f32::EPSILON);
            self.progress = (self.progress + dt / duration).min(1.0);
            self.since_payout += dt;

            if self.progress >= 1.0 - COMPLETE_EPSILON {
                self.progress = 1.0;
                out.payout = self.settle(consumer);
                out.completed_by = Some(consumer);
                self.consumer = None;
                self.phase = CorpsePhase::Consumed;
                self.visible = false;
                tracing::info!(corpse = %self.id, consumer = %consumer, heal = self.granted_heal, currency = self.granted_currency, "Corpse fully consumed");
                return out;
            }

            if self.since_payout >= self.timing.payout_interval_secs {
                self.since_payout = 0.0;
                out.payout = self.settle(consumer);
            }
        }

        if self.age >= self.timing.auto_expire_secs {
            self.phase = CorpsePhase::Expired;
            self.consumer = None;
            self.visible = false;
            out.expired = true;
            tracing::debug!(corpse = %self.id, progress = self.progress, "Corpse expired");
        } else if self.age >= self.timing.warning_starts_at() {
            self.phase = CorpsePhase::Warning;
            self.since_blink += dt;
            if self.since_blink >= self.timing.blink_interval_secs {
                self.since_blink = 0.0;
                self.visible = !self.visible;
            }
        }
        out
    }

    /// Pay `consumer` whatever progress has earned beyond what was granted.
    fn settle(&mut self, consumer: ActorId) -> Option<Payout> {
        let heal = owed(self.heal_budget, self.progress, self.granted_heal);
        let currency = owed(self.currency_budget, self.progress, self.granted_currency);
        if heal == 0 && currency == 0 {
            return None;
        }
        self.granted_heal = self.granted_heal.saturating_add(heal);
        self.granted_currency = self.granted_currency.saturating_add(currency);
        Some(Payout {
            consumer,
            heal,
            currency,
        })
    }

    /// Handle of this corpse.
    pub const fn id(&self) -> CorpseId {
        self.id
    }

    /// The actor whose death left this corpse.
    pub const fn source(&self) -> ActorId {
        self.source
    }

    /// Level of the creature that died.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Where the corpse lies.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current claimant, if any.
    pub const fn consumer(&self) -> Option<ActorId> {
        self.consumer
    }

    /// Consumption progress in `[0, 1]`.
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Heal paid out so far.
    pub const fn granted_heal(&self) -> u32 {
        self.granted_heal
    }

    /// Currency paid out so far.
    pub const fn granted_currency(&self) -> u32 {
        self.granted_currency
    }

    /// Total heal if fully consumed.
    pub const fn heal_budget(&self) -> u32 {
        self.heal_budget
    }

    /// Total currency if fully consumed.
    pub const fn currency_budget(&self) -> u32 {
        self.currency_budget
    }

    /// Seconds since the corpse was created.
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Lifecycle phase.
    pub const fn phase(&self) -> CorpsePhase {
        self.phase
    }

    /// Whether a renderer should currently draw the corpse.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether consumption has finished.
    pub fn is_fully_consumed(&self) -> bool {
        self.progress >= 1.0
    }
}

/// `round(budget * progress) - granted`, never negative.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn owed(budget: u32, progress: f32, granted: u32) -> u32 {
    let earned = (budget as f32 * progress.clamp(0.0, 1.0)).round().max(0.0) as u32;
    earned.min(budget).saturating_sub(granted)
}
