/*
Implements:
 - the graph coloring CSP (constraint graph + color domain)
 - procedures to read JSON and DIMACS instances
 - the bundled Australia map instance and seeded random instances
*/
use std::fs;

use log::info;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::color::ColorDomain;
use crate::dimacs;
use crate::error::InstanceError;
use crate::graph::{ConstraintGraph, NodeId};


/** JSON representation of an instance */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstanceFile {
    /// labels[i]: name of node i (defaults to the node id)
    pub labels: Option<Vec<String>>,
    /// 0/1 adjacency matrix
    pub adjacency: Option<Vec<Vec<u8>>>,
    /// edge list (alternative to the adjacency matrix)
    pub edges: Option<Vec<(NodeId,NodeId)>>,
    /// number of nodes (only needed with an edge list and no labels)
    pub nb_nodes: Option<usize>,
    /// ordered color domain
    pub colors: Vec<String>,
}

/** a graph coloring CSP: the constraint graph and the shared color domain */
#[derive(Debug, Clone)]
pub struct ColoringProblem {
    graph: ConstraintGraph,
    domain: ColorDomain,
}

impl ColoringProblem {
    /// creates a problem
    pub fn new(graph:ConstraintGraph, domain:ColorDomain) -> Self {
        Self { graph, domain }
    }

    /// same graph, other color domain
    pub fn with_domain(self, domain:ColorDomain) -> Self {
        Self { graph:self.graph, domain }
    }

    /// constraint graph
    pub fn graph(&self) -> &ConstraintGraph { &self.graph }

    /// color domain
    pub fn domain(&self) -> &ColorDomain { &self.domain }

    /** the map of Australia (WA, NT, SA, Q, NSW, V, T), colored with R, G, B */
    pub fn australia() -> Result<Self, InstanceError> {
        let adjacency:Vec<Vec<u8>> = vec![
            vec![0, 1, 1, 0, 0, 0, 0],
            vec![1, 0, 1, 1, 0, 0, 0],
            vec![1, 1, 0, 1, 1, 1, 0],
            vec![0, 1, 1, 0, 1, 0, 0],
            vec![0, 0, 1, 1, 0, 1, 0],
            vec![0, 0, 1, 0, 1, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0],
        ];
        let labels = ["WA", "NT", "SA", "Q", "NSW", "V", "T"]
            .iter().map(|l| l.to_string()).collect();
        let graph = ConstraintGraph::from_adjacency_matrix(&adjacency, Some(labels))?;
        Ok(Self::new(graph, ColorDomain::from_labels(&["R", "G", "B"])?))
    }

    /// builds a problem from its JSON representation
    pub fn from_instance_file(file:InstanceFile) -> Result<Self, InstanceError> {
        let domain = ColorDomain::new(file.colors)?;
        let graph = match (file.adjacency, file.edges) {
            (Some(matrix), None) => ConstraintGraph::from_adjacency_matrix(&matrix, file.labels)?,
            (None, Some(edges)) => {
                let n = match (&file.labels, file.nb_nodes) {
                    (_, Some(n)) => n,
                    (Some(l), None) => l.len(),
                    (None, None) => return Err(InstanceError::MissingAdjacency(
                        "an edge list needs `nb_nodes` or `labels`".to_string()
                    )),
                };
                ConstraintGraph::from_edges(n, &edges, file.labels)?
            },
            (None, None) => return Err(InstanceError::MissingAdjacency("none given".to_string())),
            (Some(_), Some(_)) => return Err(InstanceError::MissingAdjacency("both given".to_string())),
        };
        Ok(Self::new(graph, domain))
    }

    /// reads a JSON instance from a string
    pub fn from_json_str(s:&str) -> Result<Self, InstanceError> {
        Self::from_instance_file(serde_json::from_str(s)?)
    }

    /** reads a JSON instance from a file. */
    pub fn from_json_file(filename:&str) -> Result<Self, InstanceError> {
        let s = fs::read_to_string(filename)
            .map_err(|source| InstanceError::Io { path:filename.to_string(), source })?;
        Self::from_json_str(&s)
    }

    /// reads a DIMACS instance (the color domain is not part of the format)
    pub fn from_dimacs_file(filename:&str, domain:ColorDomain) -> Result<Self, InstanceError> {
        Ok(Self::new(dimacs::read_from_file(filename)?, domain))
    }

    /** random instance: each pair of nodes is constrained with probability density.
    The same (nb_nodes, density, seed) always gives the same graph.
    */
    pub fn random(nb_nodes:usize, density:f64, seed:u64, domain:ColorDomain) -> Result<Self, InstanceError> {
        if !(0. ..=1.).contains(&density) {
            return Err(InstanceError::InvalidRandomSpec(format!("density {}", density)));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut edges = Vec::new();
        for i in 0..nb_nodes {
            for j in (i+1)..nb_nodes {
                if rng.gen_bool(density) {
                    edges.push((i,j));
                }
            }
        }
        Ok(Self::new(ConstraintGraph::from_edges(nb_nodes, &edges, None)?, domain))
    }

    /// parses `nb_nodes:density:seed` and builds the corresponding random instance
    pub fn from_random_spec(spec:&str, domain:ColorDomain) -> Result<Self, InstanceError> {
        let invalid = || InstanceError::InvalidRandomSpec(spec.to_string());
        let fields:Vec<&str> = spec.split(':').collect();
        if fields.len() != 3 {
            return Err(invalid());
        }
        let n = fields[0].parse::<usize>().map_err(|_| invalid())?;
        let density = fields[1].parse::<f64>().map_err(|_| invalid())?;
        let seed = fields[2].parse::<u64>().map_err(|_| invalid())?;
        Self::random(n, density, seed, domain)
    }

    /// exports the instance in its JSON representation
    pub fn to_instance_file(&self) -> InstanceFile {
        InstanceFile {
            labels: Some(self.graph.nodes().iter().map(|v| v.label().to_string()).collect()),
            adjacency: None,
            edges: Some(self.graph.edges()),
            nb_nodes: Some(self.graph.nb_nodes()),
            colors: self.domain.labels().to_vec(),
        }
    }

    /// reports statistics of the instance
    pub fn display_statistics(&self) {
        self.graph.display_statistics();
        info!("\t{} \t colors ({})", self.domain.len(), self.domain.labels().join(","));
    }
}
