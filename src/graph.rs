use bit_set::BitSet;
use log::info;

use crate::error::MalformedGraphError;

/** Node Id (index of the node in the graph arena) */
pub type NodeId = usize;

/** node of the constraint graph. Fixed for the whole run. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// identifier (equal to its index)
    id: NodeId,
    /// human-readable label (used for reporting)
    label: String,
    /// constraint partners ("must differ" from this node), in ascending order
    constraints: Vec<NodeId>,
}

impl Node {
    /// identifier of the node
    pub fn id(&self) -> NodeId { self.id }

    /// label of the node
    pub fn label(&self) -> &str { &self.label }

    /// number of constraints the node is involved in
    pub fn degree(&self) -> usize { self.constraints.len() }

    /// constraint partners of the node
    pub fn constraints(&self) -> &[NodeId] { &self.constraints }
}


/**
models the constraints of a graph coloring CSP: one node per variable, one
"must differ" constraint per edge.
*/
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    /// node arena, nodes[i].id == i
    nodes: Vec<Node>,
    /// nb constraints (edges)
    nb_constraints: usize,
    /// adj_matrix[i] represents a bitset of the partners of i
    adj_matrix: Vec<BitSet>,
}

impl ConstraintGraph {

    /** builds a graph from a 0/1 adjacency matrix.
    The matrix must be square, symmetric, and have a zero diagonal.
    Missing labels default to the node id.
    */
    pub fn from_adjacency_matrix(matrix:&[Vec<u8>], labels:Option<Vec<String>>) -> Result<Self, MalformedGraphError> {
        let n = matrix.len();
        let mut adj_list = vec![Vec::new() ; n];
        for (i,row) in matrix.iter().enumerate() {
            if row.len() != n {
                return Err(MalformedGraphError::NotSquare { row:i, len:row.len(), expected:n });
            }
            for (j,value) in row.iter().enumerate() {
                match value {
                    0 => {},
                    1 => adj_list[i].push(j),
                    _ => return Err(MalformedGraphError::InvalidEntry { row:i, col:j, value:*value }),
                }
            }
        }
        Self::from_adjacency_list(adj_list, labels)
    }

    /** builds a graph from adjacency lists. adj_list[i] must list every neighbor of i,
    and i must appear in the list of each of its neighbors. Repeated neighbors are merged.
    */
    pub fn from_adjacency_list(mut adj_list:Vec<Vec<NodeId>>, labels:Option<Vec<String>>) -> Result<Self, MalformedGraphError> {
        let n = adj_list.len();
        let labels = Self::check_labels(n, labels)?;
        let mut adj_matrix = vec![BitSet::with_capacity(n) ; n];
        for (i,l) in adj_list.iter_mut().enumerate() {
            l.sort_unstable();
            l.dedup();
            for j in l.iter() {
                if *j >= n {
                    return Err(MalformedGraphError::OutOfRange { node:i, neighbor:*j, nb_nodes:n });
                }
                if *j == i {
                    return Err(MalformedGraphError::SelfLoop(i));
                }
                adj_matrix[i].insert(*j);
            }
        }
        // symmetry check
        let mut m = 0;
        for (i,l) in adj_list.iter().enumerate() {
            for j in l {
                if !adj_matrix[*j].contains(i) {
                    return Err(MalformedGraphError::Asymmetric { a:i, b:*j });
                }
            }
            m += l.len();
        }
        m /= 2; // m = (∑ d(v)) / 2
        let nodes = adj_list.into_iter().zip(labels).enumerate()
            .map(|(id,(constraints,label))| Node { id, label, constraints })
            .collect();
        Ok(Self { nodes, nb_constraints:m, adj_matrix })
    }

    /** builds a graph from a list of edges (each pair is one "must differ" constraint) */
    pub fn from_edges(nb_nodes:usize, edges:&[(NodeId,NodeId)], labels:Option<Vec<String>>) -> Result<Self, MalformedGraphError> {
        let mut adj_list = vec![Vec::new() ; nb_nodes];
        for (a,b) in edges {
            for (u,v) in [(*a,*b), (*b,*a)].iter() {
                if *u >= nb_nodes {
                    return Err(MalformedGraphError::OutOfRange { node:*v, neighbor:*u, nb_nodes });
                }
            }
            adj_list[*a].push(*b);
            adj_list[*b].push(*a);
        }
        Self::from_adjacency_list(adj_list, labels)
    }

    /// labels of the nodes (node id if none given)
    fn check_labels(n:usize, labels:Option<Vec<String>>) -> Result<Vec<String>, MalformedGraphError> {
        match labels {
            None => Ok((0..n).map(|i| i.to_string()).collect()),
            Some(l) if l.len() != n => Err(MalformedGraphError::LabelCount { expected:n, got:l.len() }),
            Some(l) => Ok(l),
        }
    }

    /// number of nodes
    pub fn nb_nodes(&self) -> usize { self.nodes.len() }

    /// number of constraints
    pub fn nb_constraints(&self) -> usize { self.nb_constraints }

    /// node arena
    pub fn nodes(&self) -> &[Node] { &self.nodes }

    /// node with identifier id
    pub fn node(&self, id:NodeId) -> &Node { &self.nodes[id] }

    /// degree of node id
    pub fn degree(&self, id:NodeId) -> usize { self.nodes[id].degree() }

    /// constraint partners of node id
    pub fn constraints(&self, id:NodeId) -> &[NodeId] { self.nodes[id].constraints() }

    /// label of node id
    pub fn label(&self, id:NodeId) -> &str { self.nodes[id].label() }

    /// returns true if a and b must take different colors. O(1)
    pub fn are_adjacent(&self, a:NodeId, b:NodeId) -> bool {
        self.adj_matrix[a].contains(b)
    }

    /// edge list (each constraint once, smallest id first)
    pub fn edges(&self) -> Vec<(NodeId,NodeId)> {
        let mut res = Vec::with_capacity(self.nb_constraints);
        for node in &self.nodes {
            for j in node.constraints() {
                if node.id < *j {
                    res.push((node.id, *j));
                }
            }
        }
        res
    }

    /// reports statistics of the graph
    pub fn display_statistics(&self) {
        info!("\t{} \t nodes", self.nb_nodes());
        info!("\t{} \t constraints", self.nb_constraints());
        let degrees = self.nodes.iter().map(|v| v.degree());
        if let (Some(min), Some(max)) = (degrees.clone().min(), degrees.max()) {
            info!("\t{} \t min degree", min);
            info!("\t{} \t max degree", max);
        }
    }
}
