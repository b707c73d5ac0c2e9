use bit_set::BitSet;
use serde::{Serialize, Deserialize};

use crate::error::InstanceError;
use crate::graph::{ConstraintGraph, NodeId};

/** Color id (index of the color in the color domain) */
pub type Color = usize;

/** ordered finite set of colors shared by every node */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorDomain {
    /// labels[c]: name of color c
    labels: Vec<String>,
}

impl ColorDomain {
    /// creates a domain. Fails if empty or if a label is repeated
    pub fn new(labels:Vec<String>) -> Result<Self, InstanceError> {
        if labels.is_empty() {
            return Err(InstanceError::EmptyDomain);
        }
        for (i,l) in labels.iter().enumerate() {
            if labels[..i].contains(l) {
                return Err(InstanceError::DuplicateColor(l.clone()));
            }
        }
        Ok(Self { labels })
    }

    /// creates a domain from string slices
    pub fn from_labels(labels:&[&str]) -> Result<Self, InstanceError> {
        Self::new(labels.iter().map(|l| l.to_string()).collect())
    }

    /// parses a comma-separated list of colors ("R,G,B")
    pub fn parse(s:&str) -> Result<Self, InstanceError> {
        Self::new(s.split(',').map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect())
    }

    /// number of colors
    pub fn len(&self) -> usize { self.labels.len() }

    /// always false (a domain has at least one color)
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// colors in domain order
    pub fn colors(&self) -> std::ops::Range<Color> { 0..self.labels.len() }

    /// name of color c
    pub fn label(&self, c:Color) -> &str { &self.labels[c] }

    /// all color names
    pub fn labels(&self) -> &[String] { &self.labels }
}


/** complete coloring, in assignment order */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    /// (node, color) pairs, in the order the nodes were assigned
    order: Vec<(NodeId, Color)>,
}

impl Coloring {
    /// builds a coloring from assignment-ordered pairs
    pub fn new(order:Vec<(NodeId, Color)>) -> Self { Self { order } }

    /// number of colored nodes
    pub fn len(&self) -> usize { self.order.len() }

    /// true if no node is colored
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// (node, color) pairs in assignment order
    pub fn iter(&self) -> impl Iterator<Item=&(NodeId, Color)> { self.order.iter() }

    /// color of a node (if colored)
    pub fn color_of(&self, v:NodeId) -> Option<Color> {
        self.order.iter().find(|(u,_)| *u == v).map(|(_,c)| *c)
    }

    /// nodes in assignment order
    pub fn assignment_order(&self) -> Vec<NodeId> {
        self.order.iter().map(|(v,_)| *v).collect()
    }

    /// res[c]: nodes colored with c
    pub fn to_partition(&self, nb_colors:usize) -> Vec<Vec<NodeId>> {
        let mut res = vec![vec![] ; nb_colors];
        for (v,c) in &self.order {
            res[*c].push(*v);
        }
        res
    }
}


/** result of the solution checker */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerResult {
    /// every node colored once, no constraint violated
    Ok,
    /// a node has no color
    UncoloredNode(NodeId),
    /// a node appears twice in the coloring (or is not a node of the graph)
    InvalidNode(NodeId),
    /// a node uses a color outside the domain
    UnknownColor(NodeId, Color),
    /// two constrained nodes share a color
    Conflict(NodeId, NodeId),
}

/**
checks a coloring against the graph. returns the first defect found.
*/
pub fn checker(graph:&ConstraintGraph, domain:&ColorDomain, coloring:&Coloring) -> CheckerResult {
    // check that all nodes are colored once
    let mut visited = BitSet::new();
    for (v,c) in coloring.iter() {
        if *v >= graph.nb_nodes() || visited.contains(*v) {
            return CheckerResult::InvalidNode(*v);
        }
        if *c >= domain.len() {
            return CheckerResult::UnknownColor(*v, *c);
        }
        visited.insert(*v);
    }
    if let Some(v) = (0..graph.nb_nodes()).find(|v| !visited.contains(*v)) {
        return CheckerResult::UncoloredNode(v);
    }
    // check conflicts inside each color class
    for class in coloring.to_partition(domain.len()) {
        for (i,a) in class.iter().enumerate() {
            for b in &class[i+1..] {
                if graph.are_adjacent(*a, *b) {
                    return CheckerResult::Conflict(*a.min(b), *a.max(b));
                }
            }
        }
    }
    CheckerResult::Ok
}


#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> ConstraintGraph {
        ConstraintGraph::from_edges(3, &[(0,1),(1,2)], None).unwrap()
    }

    #[test]
    fn test_domain() {
        let d = ColorDomain::parse("R, G,B").unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.label(1), "G");
        assert_eq!(d.colors().collect::<Vec<_>>(), vec![0,1,2]);
        assert!(matches!(ColorDomain::parse(""), Err(InstanceError::EmptyDomain)));
        assert!(matches!(
            ColorDomain::from_labels(&["R","R"]),
            Err(InstanceError::DuplicateColor(ref c)) if c == "R"
        ));
    }

    #[test]
    fn test_coloring_views() {
        let coloring = Coloring::new(vec![(1,0),(0,1),(2,1)]);
        assert_eq!(coloring.assignment_order(), vec![1,0,2]);
        assert_eq!(coloring.color_of(2), Some(1));
        assert_eq!(coloring.color_of(5), None);
        assert_eq!(coloring.to_partition(2), vec![vec![1], vec![0,2]]);
    }

    #[test]
    fn test_checker() {
        let g = path3();
        let d = ColorDomain::from_labels(&["R","G"]).unwrap();
        assert_eq!(checker(&g, &d, &Coloring::new(vec![(1,0),(0,1),(2,1)])), CheckerResult::Ok);
        assert_eq!(
            checker(&g, &d, &Coloring::new(vec![(1,0),(0,0),(2,1)])),
            CheckerResult::Conflict(0,1)
        );
        assert_eq!(
            checker(&g, &d, &Coloring::new(vec![(1,0),(0,1)])),
            CheckerResult::UncoloredNode(2)
        );
        assert_eq!(
            checker(&g, &d, &Coloring::new(vec![(1,0),(1,1),(2,1)])),
            CheckerResult::InvalidNode(1)
        );
        assert_eq!(
            checker(&g, &d, &Coloring::new(vec![(1,0),(0,4),(2,1)])),
            CheckerResult::UnknownColor(0,4)
        );
    }
}
