//! Per-tick output contracts of the director.
//!
//! `changes` carries the values written this tick keyed by target path;
//! `events` carries the discrete signals (rejected clips, lost targets,
//! layout refreshes) adapters may want to surface.

use serde::{Deserialize, Serialize};

use crate::blend::BlendState;
use crate::ids::{ClipId, TrackId};
use crate::value::Value;

/// One target value produced for a track this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub track: TrackId,
    pub key: String,
    pub value: Value,
    pub state: BlendState,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum CoreEvent {
    /// A clip failed layout validation and is excluded from playback.
    ClipRejected {
        track: TrackId,
        clip: ClipId,
        reason: String,
    },
    /// The bound target disappeared; reported once per binding.
    TargetLost { track: TrackId, key: String },
    /// Clip bounds were recalculated for a new cache token.
    LayoutRefreshed { track: TrackId },
    /// A track failed to evaluate this tick; other tracks were unaffected.
    Error { track: TrackId, message: String },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Value written for `key` this tick, if any.
    pub fn change_for(&self, key: &str) -> Option<&Value> {
        self.changes.iter().find(|c| c.key == key).map(|c| &c.value)
    }
}
