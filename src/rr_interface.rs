use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// all graph references are indices into the network's node arena
pub type NodeIndex = usize;
pub type EventId = u64;
pub type MessageId = u64;
pub type RrTime = u64;

// ============================================================================
// Position
// ============================================================================

/// Integer coordinate of a node. Equality is by value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn distance_squared(&self, other: &Position) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses a single `x,y` line of a network description.
impl FromStr for Position {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 2 {
            return Err(FormatError::MissingSeparator {
                line: line.to_string(),
            });
        }

        let coordinate = |part: &str| {
            part.parse::<i32>()
                .map_err(|_| FormatError::InvalidCoordinate {
                    line: line.to_string(),
                })
        };

        Ok(Position::new(coordinate(parts[0])?, coordinate(parts[1])?))
    }
}

// ============================================================================
// Event
// ============================================================================

/// Something that happened at a node at a given tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Event {
    id: EventId,
    position: Position,
    time: RrTime,
}

impl Event {
    pub fn new(id: EventId, position: Position, time: RrTime) -> Self {
        Self { id, position, time }
    }

    /// Creates the event happening at `position` at tick `time`, with the
    /// identifier derived from both.
    pub fn at(position: Position, time: RrTime) -> Self {
        Self::new(Self::derive_id(time, &position), position, time)
    }

    /// Identifier of an event: blake3 over (time, x, y), truncated to 64 bits.
    /// Two events at the same position and tick share an id.
    pub fn derive_id(time: RrTime, position: &Position) -> EventId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&time.to_le_bytes());
        hasher.update(&position.x().to_le_bytes());
        hasher.update(&position.y().to_le_bytes());

        let hash = hasher.finalize();
        let mut id = [0u8; 8];
        id.copy_from_slice(&hash.as_bytes()[..8]);
        EventId::from_le_bytes(id)
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn time(&self) -> RrTime {
        self.time
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pos: ({}, {}), Time: {}, Id: {}",
            self.position.x(),
            self.position.y(),
            self.time,
            self.id
        )
    }
}

// ============================================================================
// Message progress
// ============================================================================

/// Outcome of a single `step` of an agent or query.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Progress {
    /// Not at the head of its node's queue; nothing happened this tick
    Parked,
    /// Acted this tick and is still live
    Advanced,
    /// Terminal; the message must be removed from the simulation
    Done,
}

// ============================================================================
// Errors
// ============================================================================

/// A network description (or its parameters) that can not be turned into a network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid file format. First line must be an integer.")]
    InvalidNodeCount,

    #[error("Invalid file format. Number of nodes doesn't match the number of given positions.")]
    NodeCountMismatch { declared: usize, found: usize },

    #[error("Invalid file format. Coordinates are not divided by ','")]
    MissingSeparator { line: String },

    #[error("Invalid file format. Coordinates not given as integers.")]
    InvalidCoordinate { line: String },

    #[error("Invalid file format. Two nodes with the same position.")]
    DuplicatePosition(Position),

    #[error("Invalid file format. Node without neighbours.")]
    IsolatedNode(Position),

    #[error("invalid network parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Corrupted simulation state. These are never retried; the run is over.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("message {message} has no reachable neighbour at node {node} and nowhere to backtrack")]
    NoReachableNeighbour { message: MessageId, node: NodeIndex },

    #[error("message {message} lost the path to event {event} at node {node}")]
    BrokenPath {
        message: MessageId,
        node: NodeIndex,
        event: EventId,
    },
}

// ============================================================================
// Event sink
// ============================================================================

/// Notable things happening in a network, reported through an [`EventSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingEvent {
    EventCreated {
        event: Event,
    },
    AgentSpawned {
        agent: MessageId,
        node: NodeIndex,
    },
    AgentRetired {
        agent: MessageId,
        node: NodeIndex,
    },
    QuerySpawned {
        query: MessageId,
        node: NodeIndex,
        target: EventId,
    },
    QueryReturned {
        query: MessageId,
        event: Event,
        /// ticks between spawn and return
        latency: RrTime,
    },
    QueryExpired {
        query: MessageId,
        target: EventId,
    },
}

pub trait EventSink {
    fn log(&mut self, time: RrTime, event: RoutingEvent);
}

/// Sink used when nobody is listening
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _time: RrTime, _event: RoutingEvent) {}
}
