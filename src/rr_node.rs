use std::collections::VecDeque;

use crate::rr_event_info::{EventInfo, EventTable};
use crate::rr_interface::{Event, EventId, MessageId, NodeIndex, Position, RrTime};

/// A vertex of the network.
///
/// Only the message at the head of `queue` may act on the node in a tick,
/// which serializes every table merge at this node.
#[derive(Debug, Clone)]
pub struct Node {
    position: Position,
    neighbours: Vec<NodeIndex>,
    events: EventTable,
    queue: VecDeque<MessageId>,
}

impl Node {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            neighbours: Vec::new(),
            events: EventTable::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn neighbours(&self) -> &[NodeIndex] {
        &self.neighbours
    }

    pub fn set_neighbours(&mut self, neighbours: Vec<NodeIndex>) {
        self.neighbours = neighbours;
    }

    /// Records an event happening here at `time` and returns its id.
    pub fn create_event(&mut self, time: RrTime) -> EventId {
        let event = Event::at(self.position, time);
        self.events.insert(event.id(), EventInfo::Located(event));
        event.id()
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventTable {
        &mut self.events
    }

    pub fn event_info(&self, id: &EventId) -> Option<&EventInfo> {
        self.events.get(id)
    }

    // ===== Message queue =====

    pub fn enqueue_message(&mut self, message: MessageId) {
        self.queue.push_back(message);
    }

    pub fn front_message(&self) -> Option<MessageId> {
        self.queue.front().copied()
    }

    pub fn is_front(&self, message: MessageId) -> bool {
        self.front_message() == Some(message)
    }

    pub fn dequeue_message(&mut self) -> Option<MessageId> {
        self.queue.pop_front()
    }

    pub fn is_queued(&self, message: MessageId) -> bool {
        self.queue.contains(&message)
    }

    /// Drops `message` wherever it sits in the queue.
    pub fn remove_message(&mut self, message: MessageId) -> bool {
        match self.queue.iter().position(|m| *m == message) {
            Some(at) => {
                self.queue.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn queue(&self) -> &VecDeque<MessageId> {
        &self.queue
    }
}

/// Identity of a node is its position.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Node {}
