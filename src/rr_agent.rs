//! Agents gossip event knowledge.
//!
//! An agent wanders the network on a self-avoiding random walk. At every
//! node it visits it exchanges tables with the node (keeping the shorter
//! distance on each side) and then ages its own table, so every entry it
//! carries points back at the node it just left.

use log::debug;
use rand::Rng;

use crate::rr_event_info::{EventInfo, EventTable};
use crate::rr_interface::{MessageId, NodeIndex, Progress, RoutingError};
use crate::rr_node::Node;
use crate::rr_walk::RandomWalk;

#[derive(Debug, Clone)]
pub struct Agent {
    id: MessageId,
    current: NodeIndex,
    walk: RandomWalk,
    iteration: usize,
    max_steps: usize,
    events: EventTable,
}

impl Agent {
    /// Creates an agent at `home` and queues it there.
    pub fn new(id: MessageId, home: NodeIndex, nodes: &mut [Node], max_steps: usize) -> Self {
        nodes[home].enqueue_message(id);

        Self {
            id,
            current: home,
            walk: RandomWalk::new(home),
            iteration: 0,
            max_steps,
            events: EventTable::new(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn current_node(&self) -> NodeIndex {
        self.current
    }

    pub fn path(&self) -> &[NodeIndex] {
        self.walk.path()
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventTable {
        &mut self.events
    }

    /// One tick of the agent. Returns `Done` once the step budget is spent.
    pub fn step<R: Rng>(&mut self, nodes: &mut [Node], rng: &mut R) -> Result<Progress, RoutingError> {
        if self.iteration >= self.max_steps {
            nodes[self.current].remove_message(self.id);
            return Ok(Progress::Done);
        }

        if !nodes[self.current].is_front(self.id) {
            return Ok(Progress::Parked);
        }
        nodes[self.current].dequeue_message();

        self.merge_tables(&mut nodes[self.current]);
        self.age_table();

        let next = self.walk.step(self.id, self.current, nodes, rng)?;
        self.current = next;
        nodes[next].enqueue_message(self.id);
        self.iteration += 1;

        Ok(Progress::Advanced)
    }

    /// Exchanges knowledge with `node`, the node the agent currently stands on.
    ///
    /// For shared ids the side with more steps adopts the other side's
    /// entry; equal step counts are left alone. Ids known to only one side
    /// are copied over.
    pub fn merge_tables(&mut self, node: &mut Node) {
        let here = self.current;
        let table = node.events_mut();

        for (id, carried) in self.events.iter_mut() {
            match table.get_mut(id) {
                None => {
                    table.insert(*id, carried.breadcrumb(here));
                }
                Some(held) => {
                    if carried.steps() > held.steps() {
                        *carried = EventInfo::pointer(here, held.steps());
                    } else if carried.steps() < held.steps() {
                        *held = carried.breadcrumb(here);
                    }
                }
            }
        }

        for (id, held) in table.iter() {
            if !self.events.contains_key(id) {
                self.events.insert(*id, held.breadcrumb(here));
            }
        }
    }

    /// Every carried entry is now one more hop away, via the current node.
    pub fn age_table(&mut self) {
        let here = self.current;
        for info in self.events.values_mut() {
            info.age(here);
        }

        if !self.events.is_empty() {
            debug!(
                "agent {} carries {} entries from node {}",
                self.id,
                self.events.len(),
                here
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr_interface::{Event, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const AGENT_MAX_STEPS: usize = 50;

    fn isolated(positions: &[(i32, i32)]) -> Vec<Node> {
        positions
            .iter()
            .map(|(x, y)| Node::new(Position::new(*x, *y)))
            .collect()
    }

    fn located(id: u64) -> EventInfo {
        EventInfo::Located(Event::new(id, Position::new(0, 0), 12))
    }

    #[test]
    fn test_new_agent_is_queued_at_home() {
        let mut nodes = isolated(&[(0, 0)]);
        let agent = Agent::new(7, 0, &mut nodes, AGENT_MAX_STEPS);

        assert_eq!(agent.current_node(), 0);
        assert_eq!(agent.path(), &[0]);
        assert!(nodes[0].is_front(7));
    }

    #[test]
    fn test_agent_moves_to_neighbour() {
        let mut nodes = isolated(&[(2, 2), (0, 0)]);
        nodes[0].set_neighbours(vec![1]);
        nodes[1].set_neighbours(vec![0]);
        let mut rng = StdRng::seed_from_u64(1);

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        assert_eq!(agent.step(&mut nodes, &mut rng), Ok(Progress::Advanced));

        assert_eq!(agent.current_node(), 1);
        assert_eq!(agent.path(), &[0, 1]);
        assert_eq!(agent.iteration(), 1);
        assert!(nodes[0].queue().is_empty());
        assert!(nodes[1].is_front(1));
    }

    #[test]
    fn test_agent_parks_behind_other_message() {
        let mut nodes = isolated(&[(0, 0), (1, 0)]);
        nodes[0].set_neighbours(vec![1]);
        nodes[1].set_neighbours(vec![0]);
        nodes[0].enqueue_message(99);
        let mut rng = StdRng::seed_from_u64(1);

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        assert_eq!(agent.step(&mut nodes, &mut rng), Ok(Progress::Parked));
        assert_eq!(agent.current_node(), 0);
        assert_eq!(agent.iteration(), 0);
    }

    #[test]
    fn test_agent_retires_when_budget_spent() {
        let mut nodes = isolated(&[(0, 0), (1, 0), (2, 0)]);
        nodes[0].set_neighbours(vec![1]);
        nodes[1].set_neighbours(vec![0, 2]);
        nodes[2].set_neighbours(vec![1]);
        let mut rng = StdRng::seed_from_u64(1);

        let mut agent = Agent::new(1, 0, &mut nodes, 2);
        assert_eq!(agent.step(&mut nodes, &mut rng), Ok(Progress::Advanced));

        // park it behind another message; the budget check still removes it
        nodes[2].enqueue_message(50);
        assert_eq!(agent.step(&mut nodes, &mut rng), Ok(Progress::Advanced));
        assert_eq!(agent.current_node(), 2);
        assert!(nodes[2].is_queued(1));

        assert_eq!(agent.step(&mut nodes, &mut rng), Ok(Progress::Done));
        assert!(!nodes[2].is_queued(1));
        assert!(nodes[2].is_front(50));
    }

    #[test]
    fn test_merge_lists_of_neighbours() {
        // node under test is 0; 1, 2, 3 are the nodes entries point at
        let mut nodes = isolated(&[(2, 2), (0, 0), (1, 1), (2, 1)]);
        nodes[0].events_mut().insert(100, EventInfo::pointer(1, 10));
        nodes[0].events_mut().insert(101, EventInfo::pointer(2, 3));
        nodes[0].events_mut().insert(102, EventInfo::pointer(3, 2));

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        agent.events_mut().insert(99, EventInfo::pointer(1, 10));
        agent.events_mut().insert(101, EventInfo::pointer(2, 7));
        agent.events_mut().insert(102, EventInfo::pointer(3, 1));

        agent.merge_tables(&mut nodes[0]);

        let node_table = nodes[0].events();
        assert_eq!(node_table.len(), 4);
        assert_eq!(node_table[&99], EventInfo::pointer(1, 10));
        assert_eq!(node_table[&100], EventInfo::pointer(1, 10));
        assert_eq!(node_table[&101], EventInfo::pointer(2, 3));
        assert_eq!(node_table[&102], EventInfo::pointer(3, 1));

        let agent_table = agent.events();
        assert_eq!(agent_table.len(), 4);
        assert_eq!(agent_table[&99], EventInfo::pointer(1, 10));
        assert_eq!(agent_table[&100], EventInfo::pointer(1, 10));
        assert_eq!(agent_table[&101], EventInfo::pointer(0, 3));
        assert_eq!(agent_table[&102], EventInfo::pointer(3, 1));
    }

    #[test]
    fn test_merge_lists_of_events() {
        let mut nodes = isolated(&[(2, 2), (0, 0), (1, 1), (2, 1)]);
        nodes[0].events_mut().insert(103, located(103));
        nodes[0].events_mut().insert(100, located(100));
        nodes[0].events_mut().insert(101, located(101));

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        agent.events_mut().insert(100, EventInfo::pointer(1, 10));
        agent.events_mut().insert(101, EventInfo::pointer(2, 3));
        agent.events_mut().insert(102, EventInfo::pointer(3, 2));

        agent.merge_tables(&mut nodes[0]);

        // located entries never lose against a pointer
        let node_table = nodes[0].events();
        assert_eq!(node_table.len(), 4);
        assert_eq!(node_table[&100], located(100));
        assert_eq!(node_table[&101], located(101));
        assert_eq!(node_table[&103], located(103));
        assert_eq!(node_table[&102], EventInfo::pointer(3, 2));

        let agent_table = agent.events();
        assert_eq!(agent_table.len(), 4);
        assert_eq!(agent_table[&100], EventInfo::pointer(0, 0));
        assert_eq!(agent_table[&101], EventInfo::pointer(0, 0));
        assert_eq!(agent_table[&103], EventInfo::pointer(0, 0));
        assert_eq!(agent_table[&102], EventInfo::pointer(3, 2));
    }

    #[test]
    fn test_merge_into_empty_agent() {
        let mut nodes = isolated(&[(2, 2), (0, 0)]);
        nodes[0].events_mut().insert(100, EventInfo::pointer(1, 10));
        nodes[0].events_mut().insert(99, located(99));

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        agent.merge_tables(&mut nodes[0]);

        assert_eq!(nodes[0].events().len(), 2);
        assert_eq!(nodes[0].events()[&99], located(99));

        assert_eq!(agent.events()[&100], EventInfo::pointer(1, 10));
        assert_eq!(agent.events()[&99], EventInfo::pointer(0, 0));
    }

    #[test]
    fn test_merge_keeps_shorter_node_entry() {
        // node: X at 2 via P; agent: X at 5 via Q
        let mut nodes = isolated(&[(0, 0), (1, 0), (2, 0)]);
        let (p, q) = (1, 2);
        nodes[0].events_mut().insert(7, EventInfo::pointer(p, 2));

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        agent.events_mut().insert(7, EventInfo::pointer(q, 5));

        agent.merge_tables(&mut nodes[0]);
        assert_eq!(nodes[0].events()[&7], EventInfo::pointer(p, 2));
        assert_eq!(agent.events()[&7], EventInfo::pointer(0, 2));

        agent.age_table();
        assert_eq!(agent.events()[&7], EventInfo::pointer(0, 3));
    }

    #[test]
    fn test_merge_twice_is_idempotent() {
        let mut nodes = isolated(&[(0, 0), (1, 0), (2, 0)]);
        nodes[0].events_mut().insert(1, EventInfo::pointer(1, 4));
        nodes[0].events_mut().insert(2, located(2));
        nodes[0].events_mut().insert(3, EventInfo::pointer(2, 1));

        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        agent.events_mut().insert(1, EventInfo::pointer(2, 2));
        agent.events_mut().insert(3, EventInfo::pointer(1, 6));
        agent.events_mut().insert(4, EventInfo::pointer(2, 3));

        agent.merge_tables(&mut nodes[0]);
        let once = nodes[0].events().clone();

        agent.merge_tables(&mut nodes[0]);
        assert_eq!(nodes[0].events(), &once);
    }

    #[test]
    fn test_update_list() {
        let mut nodes = isolated(&[(2, 2), (0, 0), (1, 1), (2, 1)]);
        let mut agent = Agent::new(1, 0, &mut nodes, AGENT_MAX_STEPS);
        agent.events_mut().insert(100, EventInfo::pointer(1, 10));
        agent.events_mut().insert(101, EventInfo::pointer(2, 3));
        agent.events_mut().insert(102, EventInfo::pointer(3, 2));

        agent.age_table();

        assert_eq!(agent.events()[&100], EventInfo::pointer(0, 11));
        assert_eq!(agent.events()[&101], EventInfo::pointer(0, 4));
        assert_eq!(agent.events()[&102], EventInfo::pointer(0, 3));
    }

    #[test]
    fn test_agent_leaves_breadcrumbs() {
        // 0 - 1 - 2, event at 2, agent starts at 2
        let mut nodes = isolated(&[(0, 0), (10, 0), (20, 0)]);
        nodes[0].set_neighbours(vec![1]);
        nodes[1].set_neighbours(vec![0, 2]);
        nodes[2].set_neighbours(vec![1]);
        let id = nodes[2].create_event(4);
        let mut rng = StdRng::seed_from_u64(5);

        let mut agent = Agent::new(1, 2, &mut nodes, 2);
        agent.step(&mut nodes, &mut rng).unwrap();
        agent.step(&mut nodes, &mut rng).unwrap();
        agent.step(&mut nodes, &mut rng).unwrap();

        assert_eq!(nodes[1].event_info(&id), Some(&EventInfo::pointer(2, 1)));
        assert_eq!(nodes[0].event_info(&id), None);
        assert_eq!(agent.events()[&id], EventInfo::pointer(1, 2));
    }
}
