use hashbrown::HashSet;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::rr_interface::{MessageId, NodeIndex, RoutingError};
use crate::rr_node::Node;

/// Self-avoiding random walk with depth-first backtracking.
///
/// `memory` is always the route from the walk origin to the current node,
/// current node excluded, so popping it retraces the walk.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    visited: HashSet<NodeIndex>,
    memory: Vec<NodeIndex>,
    path: Vec<NodeIndex>,
}

impl RandomWalk {
    pub fn new(origin: NodeIndex) -> Self {
        Self {
            visited: HashSet::new(),
            memory: Vec::new(),
            path: vec![origin],
        }
    }

    /// Forget everything and start over at `origin`.
    pub fn reset(&mut self, origin: NodeIndex) {
        self.visited.clear();
        self.memory.clear();
        self.path.clear();
        self.path.push(origin);
    }

    /// Leaves `from` for a random unvisited neighbour, or backtracks one hop
    /// when every neighbour has been visited. Returns the node moved to.
    pub fn step<R: Rng>(
        &mut self,
        message: MessageId,
        from: NodeIndex,
        nodes: &[Node],
        rng: &mut R,
    ) -> Result<NodeIndex, RoutingError> {
        self.visited.insert(from);

        let mut candidates = nodes[from].neighbours().to_vec();
        candidates.shuffle(rng);

        let next = match candidates.into_iter().find(|n| !self.visited.contains(n)) {
            Some(next) => {
                self.memory.push(from);
                next
            }
            None => self
                .memory
                .pop()
                .ok_or(RoutingError::NoReachableNeighbour {
                    message,
                    node: from,
                })?,
        };

        self.path.push(next);
        Ok(next)
    }

    /// Moves deterministically from `from` to `to`, remembering the way back.
    pub fn follow(&mut self, from: NodeIndex, to: NodeIndex) {
        self.memory.push(from);
        self.visited.insert(to);
        self.path.push(to);
    }

    /// Next hop back towards the origin, if any.
    pub fn retrace(&mut self) -> Option<NodeIndex> {
        let previous = self.memory.pop()?;
        self.path.push(previous);
        Some(previous)
    }

    pub fn mark_visited(&mut self, node: NodeIndex) {
        self.visited.insert(node);
    }

    pub fn has_visited(&self, node: NodeIndex) -> bool {
        self.visited.contains(&node)
    }

    pub fn memory(&self) -> &[NodeIndex] {
        &self.memory
    }

    /// Every node the walk has stood on, in order
    pub fn path(&self) -> &[NodeIndex] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr_interface::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Nodes 0 - 1 - ... - (n-1), each linked to its line neighbours.
    fn line(n: usize) -> Vec<Node> {
        (0..n)
            .map(|i| {
                let mut node = Node::new(Position::new(i as i32 * 10, 0));
                let mut neighbours = Vec::new();
                if i > 0 {
                    neighbours.push(i - 1);
                }
                if i + 1 < n {
                    neighbours.push(i + 1);
                }
                node.set_neighbours(neighbours);
                node
            })
            .collect()
    }

    #[test]
    fn test_walk_never_revisits_on_a_line() {
        let nodes = line(5);
        let mut rng = StdRng::seed_from_u64(1);
        let mut walk = RandomWalk::new(0);

        let mut at = 0;
        for _ in 0..4 {
            at = walk.step(1, at, &nodes, &mut rng).unwrap();
        }

        assert_eq!(walk.path(), &[0, 1, 2, 3, 4]);
        assert_eq!(walk.memory(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_walk_backtracks_then_fails() {
        let nodes = line(3);
        let mut rng = StdRng::seed_from_u64(2);
        let mut walk = RandomWalk::new(0);

        let mut at = 0;
        at = walk.step(1, at, &nodes, &mut rng).unwrap();
        at = walk.step(1, at, &nodes, &mut rng).unwrap();
        assert_eq!(at, 2);

        // dead end: back to 1, then 0
        at = walk.step(1, at, &nodes, &mut rng).unwrap();
        assert_eq!(at, 1);
        at = walk.step(1, at, &nodes, &mut rng).unwrap();
        assert_eq!(at, 0);
        assert!(walk.memory().is_empty());

        assert_eq!(
            walk.step(1, at, &nodes, &mut rng),
            Err(RoutingError::NoReachableNeighbour { message: 1, node: 0 })
        );
    }

    #[test]
    fn test_walk_visits_distinct_nodes_on_complete_graph() {
        let mut nodes: Vec<Node> = (0..6)
            .map(|i| Node::new(Position::new(i, i)))
            .collect();
        for i in 0..6 {
            nodes[i].set_neighbours((0..6).filter(|j| *j != i).collect());
        }

        let mut rng = StdRng::seed_from_u64(3);
        let mut walk = RandomWalk::new(0);
        let mut at = 0;
        for _ in 0..5 {
            at = walk.step(9, at, &nodes, &mut rng).unwrap();
        }

        let mut seen = walk.path().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_follow_and_retrace() {
        let mut walk = RandomWalk::new(0);
        walk.follow(0, 1);
        walk.follow(1, 2);

        assert!(walk.has_visited(2));
        assert_eq!(walk.retrace(), Some(1));
        assert_eq!(walk.retrace(), Some(0));
        assert_eq!(walk.retrace(), None);
        assert_eq!(walk.path(), &[0, 1, 2, 1, 0]);

        walk.reset(0);
        assert_eq!(walk.path(), &[0]);
        assert!(!walk.has_visited(2));
    }
}
