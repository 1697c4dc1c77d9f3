//! Routing table entries.
//!
//! Every node and every agent carries an [`EventTable`]: one [`EventInfo`] per
//! known event id, either the event itself (it happened here) or a
//! breadcrumb pointing at the neighbour the information arrived through.

use indexmap::IndexMap;

use crate::rr_interface::{Event, EventId, NodeIndex};

/// Insertion-ordered so that iteration (and therefore seeded runs) is reproducible.
pub type EventTable = IndexMap<EventId, EventInfo>;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EventInfo {
    /// The event happened at the node holding this entry
    Located(Event),

    /// The event is `steps` hops away, last seen via node `via`
    Pointer { via: NodeIndex, steps: u32 },
}

impl EventInfo {
    pub fn pointer(via: NodeIndex, steps: u32) -> Self {
        EventInfo::Pointer { via, steps }
    }

    pub fn steps(&self) -> u32 {
        match self {
            EventInfo::Located(_) => 0,
            EventInfo::Pointer { steps, .. } => *steps,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, EventInfo::Located(_))
    }

    pub fn event(&self) -> Option<&Event> {
        match self {
            EventInfo::Located(event) => Some(event),
            EventInfo::Pointer { .. } => None,
        }
    }

    pub fn via(&self) -> Option<NodeIndex> {
        match self {
            EventInfo::Located(_) => None,
            EventInfo::Pointer { via, .. } => Some(*via),
        }
    }

    /// Entry to hand over to another table while standing at `here`.
    ///
    /// A located entry can not leave its node, so it becomes a pointer to
    /// `here` keeping its step count; a pointer is copied as is.
    pub fn breadcrumb(&self, here: NodeIndex) -> Self {
        match self {
            EventInfo::Located(_) => EventInfo::pointer(here, 0),
            EventInfo::Pointer { .. } => *self,
        }
    }

    /// One hop further away, reached through `here`.
    pub fn age(&mut self, here: NodeIndex) {
        *self = EventInfo::pointer(here, self.steps() + 1);
    }
}
