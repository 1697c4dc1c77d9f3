//! Queries search for one event.
//!
//! A query wanders randomly (`Searching`) until it stands on a node that
//! knows the target id. A pointer entry makes it follow the breadcrumbs
//! (`FollowingPath`); the located entry makes it retrace its own route home
//! (`Returning`) until it is back at its origin (`Returned`). A search that
//! runs out of steps restarts once from the origin, and expires the second
//! time (`Expired`).

use log::debug;
use rand::Rng;

use crate::rr_event_info::EventInfo;
use crate::rr_interface::{Event, EventId, MessageId, NodeIndex, Progress, RoutingError, RrTime};
use crate::rr_node::Node;
use crate::rr_walk::RandomWalk;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum QueryState {
    Searching { after_reset: bool },
    FollowingPath,
    Returning { event: Event },
    Returned { event: Event },
    Expired,
}

impl QueryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryState::Returned { .. } | QueryState::Expired)
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    id: MessageId,
    target: EventId,
    origin: NodeIndex,
    current: NodeIndex,
    state: QueryState,
    walk: RandomWalk,
    max_steps: usize,
    active_steps: usize,
    /// ticks spent parked since the last turn
    wait_ticks: usize,
    resend_after: usize,
    resent: bool,
    spawned_at: RrTime,
}

impl Query {
    /// Creates a query for `target` at `origin` and queues it there.
    pub fn new(
        id: MessageId,
        origin: NodeIndex,
        target: EventId,
        nodes: &mut [Node],
        max_steps: usize,
        resend_multiplier: usize,
    ) -> Self {
        nodes[origin].enqueue_message(id);

        let mut walk = RandomWalk::new(origin);
        walk.mark_visited(origin);

        Self {
            id,
            target,
            origin,
            current: origin,
            state: QueryState::Searching { after_reset: false },
            walk,
            max_steps,
            active_steps: 0,
            wait_ticks: 0,
            resend_after: max_steps.saturating_mul(resend_multiplier),
            resent: false,
            spawned_at: 0,
        }
    }

    pub fn with_spawn_time(mut self, time: RrTime) -> Self {
        self.spawned_at = time;
        self
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn target(&self) -> EventId {
        self.target
    }

    pub fn origin(&self) -> NodeIndex {
        self.origin
    }

    pub fn current_node(&self) -> NodeIndex {
        self.current
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn path(&self) -> &[NodeIndex] {
        self.walk.path()
    }

    pub fn active_steps(&self) -> usize {
        self.active_steps
    }

    pub fn has_been_resent(&self) -> bool {
        self.resent
    }

    pub fn spawned_at(&self) -> RrTime {
        self.spawned_at
    }

    /// The event brought home, once the query has returned.
    pub fn found_event(&self) -> Option<&Event> {
        match &self.state {
            QueryState::Returned { event } => Some(event),
            _ => None,
        }
    }

    /// One tick of the query.
    pub fn step<R: Rng>(&mut self, nodes: &mut [Node], rng: &mut R) -> Result<Progress, RoutingError> {
        if self.state.is_terminal() {
            return Ok(Progress::Done);
        }

        if !nodes[self.current].is_front(self.id) {
            self.park(nodes);
            return Ok(Progress::Parked);
        }
        nodes[self.current].dequeue_message();
        self.wait_ticks = 0;

        let state = self.state;
        match state {
            QueryState::Returning { .. } => self.go_back(nodes),
            QueryState::FollowingPath => self.follow_path(nodes)?,
            QueryState::Searching { after_reset } => {
                if self.active_steps < self.max_steps {
                    if !self.compare_id(nodes)? {
                        let next = self.walk.step(self.id, self.current, nodes, rng)?;
                        self.move_to(nodes, next);
                        self.active_steps += 1;
                    }
                } else if !after_reset {
                    self.reset(nodes);
                } else {
                    debug!("query {} for {} expired", self.id, self.target);
                    self.state = QueryState::Expired;
                }
            }
            QueryState::Returned { .. } | QueryState::Expired => {}
        }

        if self.state.is_terminal() {
            Ok(Progress::Done)
        } else {
            Ok(Progress::Advanced)
        }
    }

    /// Looks for the target id at the current node and acts on a match.
    /// Returns true when the query moved because of it.
    fn compare_id(&mut self, nodes: &mut [Node]) -> Result<bool, RoutingError> {
        let known = nodes[self.current].event_info(&self.target).copied();
        match known {
            Some(EventInfo::Located(event)) => {
                self.state = QueryState::Returning { event };
                self.go_back(nodes);
                Ok(true)
            }
            Some(EventInfo::Pointer { .. }) if self.state != QueryState::FollowingPath => {
                debug!("query {} picked up a trail at node {}", self.id, self.current);
                self.state = QueryState::FollowingPath;
                self.follow_path(nodes)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Takes one hop along the breadcrumbs towards the event.
    fn follow_path(&mut self, nodes: &mut [Node]) -> Result<(), RoutingError> {
        // the node just reached may be the event's own node
        if self.compare_id(nodes)? {
            return Ok(());
        }

        let next = nodes[self.current]
            .event_info(&self.target)
            .and_then(EventInfo::via)
            .ok_or(RoutingError::BrokenPath {
                message: self.id,
                node: self.current,
                event: self.target,
            })?;

        self.walk.follow(self.current, next);
        self.current = next;
        nodes[next].enqueue_message(self.id);
        Ok(())
    }

    /// Takes one hop back along the query's own route.
    fn go_back(&mut self, nodes: &mut [Node]) {
        let event = match self.state {
            QueryState::Returning { event } => event,
            _ => return,
        };

        match self.walk.retrace() {
            Some(previous) => {
                self.current = previous;
                if self.walk.memory().is_empty() {
                    debug_assert_eq!(self.current, self.origin);
                    self.state = QueryState::Returned { event };
                } else {
                    nodes[previous].enqueue_message(self.id);
                }
            }
            // found at the origin itself
            None => self.state = QueryState::Returned { event },
        }
    }

    /// Starts the search over from the origin. Allowed once.
    fn reset(&mut self, nodes: &mut [Node]) {
        debug!(
            "query {} for {} gave up after {} steps, restarting at node {}",
            self.id, self.target, self.active_steps, self.origin
        );

        self.current = self.origin;
        self.walk.reset(self.origin);
        self.walk.mark_visited(self.origin);
        self.active_steps = 0;
        self.state = QueryState::Searching { after_reset: true };
        nodes[self.origin].enqueue_message(self.id);
    }

    /// Waiting for a turn. Only ticks spent outside the node's queue count;
    /// once they reach `resend_after` the query re-enqueues itself, once.
    fn park(&mut self, nodes: &mut [Node]) {
        let node = &mut nodes[self.current];
        if node.is_queued(self.id) {
            return;
        }

        self.wait_ticks += 1;
        if self.wait_ticks >= self.resend_after && !self.resent {
            node.enqueue_message(self.id);
            debug!("query {} resent at node {}", self.id, self.current);
            self.wait_ticks = 0;
            self.resent = true;
        }
    }

    fn move_to(&mut self, nodes: &mut [Node], next: NodeIndex) {
        self.current = next;
        nodes[next].enqueue_message(self.id);
    }
}
