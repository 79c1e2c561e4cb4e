//! Detection of clients leaving the bus.

use geoclue_bus::{BusMessage, MatchRule, NameOwnerChanged};

/// A bus name lost its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub name: String,
}

/// Turns `NameOwnerChanged` traffic into [`Departure`]s
///
/// Only the transition from an owner to no owner counts. Acquisitions and
/// handovers between peers are ignored, as is every other message.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceMonitor;

impl PresenceMonitor {
    pub fn new() -> Self {
        Self
    }

    /// Rule to subscribe so that ownership changes reach the monitor
    pub fn match_rule(&self) -> MatchRule {
        MatchRule::name_owner_changed()
    }

    pub fn inspect(&self, message: &BusMessage) -> Option<Departure> {
        let change = NameOwnerChanged::from_message(message)?;
        if !change.is_departure() {
            return None;
        }

        tracing::debug!("{} left the bus (was {})", change.name, change.old_owner);
        Some(Departure { name: change.name })
    }
}
