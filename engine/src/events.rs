//! Timed event evaluation and multiplier composition.
//!
//! The engine never reads a wall clock. Callers pass `now_ms` into every
//! operation, and this module derives which scheduled windows are active and
//! what the composed multipliers are at that instant.

use casefall_types::{EngineConfig, EventKind, ScheduledEvent};

/// Hard ceiling on upgrade success chance, in percent.
pub const UPGRADE_CHANCE_CEILING: f64 = 95.0;

/// Snapshot of which timed windows are active at a given instant.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedState<'a> {
    /// Active luck window, if any. Overlaps resolve to the latest start.
    pub luck_event: Option<&'a ScheduledEvent>,
    /// Active promoted-drop window, if any. Overlaps resolve to the latest
    /// start.
    pub drop_event: Option<&'a ScheduledEvent>,
    /// The active luck window's multiplier, or the configured baseline
    /// outside any window.
    pub global_luck: f64,
}

/// Evaluate the configured event schedule at `now_ms`.
pub fn evaluate_timed_state(config: &EngineConfig, now_ms: u64) -> TimedState<'_> {
    let mut luck_event: Option<&ScheduledEvent> = None;
    let mut drop_event: Option<&ScheduledEvent> = None;

    for event in &config.events {
        if !event.is_active(now_ms) {
            continue;
        }
        match &event.kind {
            EventKind::Luck { .. } => {
                // Latest start wins; table order breaks exact ties.
                if luck_event.map_or(true, |held| event.start_ms > held.start_ms) {
                    luck_event = Some(event);
                }
            }
            EventKind::Drop { .. } => {
                if drop_event.map_or(true, |held| event.start_ms > held.start_ms) {
                    drop_event = Some(event);
                }
            }
        }
    }

    // An active luck window replaces the configured baseline for its
    // duration; the baseline applies again once the window closes.
    let global_luck = match luck_event.map(|e| &e.kind) {
        Some(EventKind::Luck { multiplier }) if multiplier.is_finite() && *multiplier > 0.0 => {
            *multiplier
        }
        _ => sanitize(config.global_luck),
    };

    TimedState {
        luck_event,
        drop_event,
        global_luck,
    }
}

/// Compose an account's personal luck with the global/event luck.
pub fn effective_luck(account_luck: f64, config: &EngineConfig, now_ms: u64) -> f64 {
    sanitize(account_luck) * evaluate_timed_state(config, now_ms).global_luck
}

/// Upgrade success chance in percent, after the configured multiplier and
/// the hard ceiling.
pub fn upgrade_chance(base_percent: f64, config: &EngineConfig) -> f64 {
    let scaled = base_percent * sanitize(config.upgrade_chance_multiplier);
    scaled.clamp(0.0, UPGRADE_CHANCE_CEILING)
}

fn sanitize(multiplier: f64) -> f64 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}
