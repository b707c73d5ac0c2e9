use std::cmp::Ordering;

use bit_set::BitSet;
use priority_queue::PriorityQueue;

use crate::color::{Color, Coloring};
use crate::error::AssignmentError;
use crate::graph::{ConstraintGraph, NodeId};

/** priority of an unassigned node: largest degree first, then smallest id */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SelectionPriority {
    degree: usize,
    id: NodeId,
}

impl Ord for SelectionPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree.cmp(&other.degree)
            .then_with(|| other.id.cmp(&self.id))
    }
}

// `PartialOrd` needs to be implemented as well.
impl PartialOrd for SelectionPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}


/**
Assigned/unassigned partition of the nodes, with the live domain and color of each node.
Live domains and colors are stored in arenas indexed by node id.
*/
#[derive(Debug, Clone)]
pub struct AssignmentState {
    /// size of the full color domain
    nb_colors: usize,
    /// degrees[v]: degree of node v
    degrees: Vec<usize>,
    /// domains[v]: remaining candidate colors of v (ordered subsequence of 0..nb_colors)
    domains: Vec<Vec<Color>>,
    /// colors[v]: color of v if assigned
    colors: Vec<Option<Color>>,
    /// assigned nodes, in assignment order
    assigned: Vec<NodeId>,
    /// positions[v]: index of v in assigned
    positions: Vec<Option<usize>>,
    /// unassigned nodes, ordered by the degree heuristic
    unassigned: PriorityQueue<NodeId, SelectionPriority>,
    /// culprits[v]: assigned nodes that ruled out a color of v since its last reset
    culprits: Vec<BitSet>,
}

impl AssignmentState {
    /** creates the initial state: every node unassigned with the full domain */
    pub fn new(graph:&ConstraintGraph, nb_colors:usize) -> Self {
        let n = graph.nb_nodes();
        let degrees:Vec<usize> = (0..n).map(|v| graph.degree(v)).collect();
        let mut unassigned = PriorityQueue::with_capacity(n);
        for (id,degree) in degrees.iter().enumerate() {
            unassigned.push(id, SelectionPriority { degree:*degree, id });
        }
        Self {
            nb_colors,
            degrees,
            domains: vec![(0..nb_colors).collect() ; n],
            colors: vec![None ; n],
            assigned: Vec::with_capacity(n),
            positions: vec![None ; n],
            unassigned,
            culprits: vec![BitSet::new() ; n],
        }
    }

    /// unassigned node with maximum degree (ties: lowest id). Does not modify the state
    pub fn select_next(&self) -> Result<NodeId, AssignmentError> {
        self.unassigned.peek()
            .map(|(v,_)| *v)
            .ok_or(AssignmentError::Empty)
    }

    /// removes color from the live domain of v
    pub fn prune(&mut self, v:NodeId, color:Color) {
        self.domains[v].retain(|c| *c != color);
    }

    /// assigns color to the (unassigned) node v, and appends it to the assigned sequence
    pub fn commit(&mut self, v:NodeId, color:Color) {
        debug_assert!(self.colors[v].is_none());
        debug_assert!(self.positions[v].is_none());
        self.prune(v, color);
        self.colors[v] = Some(color);
        self.positions[v] = Some(self.assigned.len());
        self.assigned.push(v);
        self.unassigned.remove(&v);
    }

    /// gives a new color to the last assigned node
    pub fn recolor_tail(&mut self, color:Color) {
        if let Some(&v) = self.assigned.last() {
            self.prune(v, color);
            self.colors[v] = Some(color);
        }
    }

    /// restores the full domain of an unassigned node and forgets its culprits
    pub fn reset(&mut self, v:NodeId) {
        debug_assert!(self.colors[v].is_none());
        self.domains[v] = (0..self.nb_colors).collect();
        self.culprits[v].clear();
    }

    /// records that the assigned node u ruled out a color of v
    pub fn blame(&mut self, v:NodeId, u:NodeId) {
        debug_assert!(self.positions[u].is_some());
        self.culprits[v].insert(u);
    }

    /// nodes that ruled out a color of v since its last reset
    pub fn culprits(&self, v:NodeId) -> &BitSet { &self.culprits[v] }

    /// unassigns the last assigned node (domain and culprits reset, color cleared). Returns it
    pub fn uncommit_tail(&mut self) -> Option<NodeId> {
        let v = self.assigned.pop()?;
        self.positions[v] = None;
        self.colors[v] = None;
        self.reset(v);
        self.unassigned.push(v, SelectionPriority { degree:self.degrees[v], id:v });
        Some(v)
    }

    /** unassigns every node assigned after v (v stays assigned).
    Returns the number of unassigned nodes, or NotFound if v is not assigned.
    */
    pub fn rewind_to(&mut self, v:NodeId) -> Result<usize, AssignmentError> {
        let position = self.positions[v].ok_or(AssignmentError::NotFound(v))?;
        let mut nb_removed = 0;
        while self.assigned.len() > position+1 {
            self.uncommit_tail();
            nb_removed += 1;
        }
        Ok(nb_removed)
    }

    /// live domain of v
    pub fn domain(&self, v:NodeId) -> &[Color] { &self.domains[v] }

    /// color of v (None if unassigned)
    pub fn color(&self, v:NodeId) -> Option<Color> { self.colors[v] }

    /// index of v in the assigned sequence
    pub fn position(&self, v:NodeId) -> Option<usize> { self.positions[v] }

    /// true if v is assigned
    pub fn is_assigned(&self, v:NodeId) -> bool { self.positions[v].is_some() }

    /// assigned nodes, in assignment order
    pub fn assigned(&self) -> &[NodeId] { &self.assigned }

    /// unassigned nodes (no particular order)
    pub fn unassigned(&self) -> impl Iterator<Item=NodeId> + '_ {
        self.unassigned.iter().map(|(v,_)| *v)
    }

    /// number of assigned nodes
    pub fn nb_assigned(&self) -> usize { self.assigned.len() }

    /// number of unassigned nodes
    pub fn nb_unassigned(&self) -> usize { self.unassigned.len() }

    /// true if every node is assigned
    pub fn is_complete(&self) -> bool { self.unassigned.is_empty() }

    /// current (possibly partial) coloring, in assignment order
    pub fn coloring(&self) -> Coloring {
        Coloring::new(
            self.assigned.iter()
                .filter_map(|v| self.colors[*v].map(|c| (*v, c)))
                .collect()
        )
    }

    /**
    checks the partition and domain invariants:
     - each node is either assigned (with a color) or unassigned (without), never both
     - positions matches the assigned sequence
     - every live domain is a strictly increasing sequence of colors of the full domain
     - the culprits of an assigned node were assigned before it, unassigned nodes have none
    */
    pub fn is_consistent(&self) -> bool {
        let n = self.colors.len();
        if self.assigned.len() + self.unassigned.len() != n {
            return false;
        }
        for (i,v) in self.assigned.iter().enumerate() {
            if self.positions[*v] != Some(i) || self.colors[*v].is_none()
            || self.unassigned.get(v).is_some() {
                return false;
            }
        }
        for v in 0..n {
            if self.positions[v].is_none() && (self.colors[v].is_some() || self.unassigned.get(&v).is_none()) {
                return false;
            }
            let d = &self.domains[v];
            if d.len() > self.nb_colors || d.iter().any(|c| *c >= self.nb_colors)
            || d.windows(2).any(|w| w[0] >= w[1]) {
                return false;
            }
            let blamed_earlier = match self.positions[v] {
                None => self.culprits[v].is_empty(),
                Some(p) => self.culprits[v].iter().all(|u| matches!(self.positions[u], Some(q) if q < p)),
            };
            if !blamed_earlier {
                return false;
            }
        }
        true
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    /// star centered on 1, plus an edge 2-3
    fn graph() -> ConstraintGraph {
        ConstraintGraph::from_edges(5, &[(1,0),(1,2),(1,3),(2,3),(0,4)], None).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let s = AssignmentState::new(&graph(), 3);
        assert_eq!(s.nb_unassigned(), 5);
        assert_eq!(s.nb_assigned(), 0);
        assert_eq!(s.domain(4), &[0,1,2]);
        assert_eq!(s.color(0), None);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_select_next_degree_then_id() {
        let mut s = AssignmentState::new(&graph(), 3);
        // degrees: 0:2, 1:3, 2:2, 3:2, 4:1
        assert_eq!(s.select_next(), Ok(1));
        assert_eq!(s.select_next(), Ok(1)); // no side effect
        s.commit(1, 0);
        assert_eq!(s.select_next(), Ok(0));
        s.commit(0, 1);
        assert_eq!(s.select_next(), Ok(2));
        s.commit(2, 1);
        s.commit(3, 2);
        assert_eq!(s.select_next(), Ok(4));
        s.commit(4, 0);
        assert_eq!(s.select_next(), Err(AssignmentError::Empty));
        assert!(s.is_complete());
    }

    #[test]
    fn test_commit_prunes_domain() {
        let mut s = AssignmentState::new(&graph(), 3);
        s.commit(2, 1);
        assert_eq!(s.domain(2), &[0,2]);
        assert_eq!(s.color(2), Some(1));
        assert_eq!(s.assigned(), &[2]);
        assert!(s.is_assigned(2));
        assert!(!s.unassigned().any(|v| v == 2));
        s.recolor_tail(2);
        assert_eq!(s.domain(2), &[0]);
        assert_eq!(s.color(2), Some(2));
        assert!(s.is_consistent());
    }

    #[test]
    fn test_uncommit_tail() {
        let mut s = AssignmentState::new(&graph(), 3);
        s.commit(1, 0);
        s.commit(0, 2);
        assert_eq!(s.uncommit_tail(), Some(0));
        assert_eq!(s.domain(0), &[0,1,2]);
        assert_eq!(s.color(0), None);
        assert_eq!(s.assigned(), &[1]);
        assert_eq!(s.select_next(), Ok(0));
        assert!(s.is_consistent());
        assert_eq!(s.uncommit_tail(), Some(1));
        assert_eq!(s.uncommit_tail(), None);
    }

    #[test]
    fn test_rewind_to() {
        let mut s = AssignmentState::new(&graph(), 3);
        s.commit(1, 0);
        s.commit(0, 1);
        s.commit(2, 1);
        s.commit(3, 2);
        assert_eq!(s.rewind_to(0), Ok(2));
        assert_eq!(s.assigned(), &[1,0]);
        assert_eq!(s.domain(0), &[0,2]); // kept: still assigned
        assert_eq!(s.domain(3), &[0,1,2]);
        assert_eq!(s.color(2), None);
        assert_eq!(s.rewind_to(0), Ok(0));
        assert_eq!(s.rewind_to(3), Err(AssignmentError::NotFound(3)));
        assert!(s.is_consistent());
    }

    #[test]
    fn test_reset_and_prune() {
        let mut s = AssignmentState::new(&graph(), 3);
        s.prune(4, 0);
        s.prune(4, 2);
        assert_eq!(s.domain(4), &[1]);
        s.prune(4, 1);
        assert!(s.domain(4).is_empty());
        s.reset(4);
        assert_eq!(s.domain(4), &[0,1,2]);
    }

    #[test]
    fn test_culprits() {
        let mut s = AssignmentState::new(&graph(), 3);
        s.commit(1, 0);
        s.commit(2, 1);
        s.blame(2, 1);
        s.blame(3, 1);
        s.blame(3, 2);
        assert_eq!(s.culprits(3).iter().collect::<Vec<_>>(), vec![1,2]);
        assert_eq!(s.position(2), Some(1));
        assert_eq!(s.position(3), None);
        // an unassigned node keeps culprits only while it is being colored
        assert!(!s.is_consistent());
        s.reset(3);
        assert!(s.culprits(3).is_empty());
        assert!(s.is_consistent());
        // rewinding forgets the culprits of the removed nodes
        s.rewind_to(1).unwrap();
        assert!(s.culprits(2).is_empty());
        assert!(s.is_consistent());
    }

    #[test]
    fn test_coloring() {
        let mut s = AssignmentState::new(&graph(), 2);
        s.commit(3, 1);
        s.commit(0, 0);
        assert_eq!(s.coloring(), Coloring::new(vec![(3,1),(0,0)]));
    }
}
