use log::info;
use serde::Serialize;

/** counters collected during a search */
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStatistics {
    /// number of nodes selected by the heuristic
    pub nb_selections: usize,
    /// number of candidate colors checked against the constraints
    pub nb_candidate_evaluations: usize,
    /// number of colors committed (including re-colorings after a backjump)
    pub nb_commits: usize,
    /// number of selected nodes that could not be colored
    pub nb_failures: usize,
    /// number of successful backjumps
    pub nb_backjumps: usize,
    /// nodes unassigned by rewinds or by exhausted backjump targets
    pub nb_unassigned: usize,
    /// maximum number of simultaneously assigned nodes
    pub max_depth: usize,
    /// search time (seconds)
    pub time_searched: f32,
}

impl SearchStatistics {
    /// reports the statistics through the logger
    pub fn display(&self) {
        info!("{:>25}{:>10}", "selections:", self.nb_selections);
        info!("{:>25}{:>10}", "candidate evaluations:", self.nb_candidate_evaluations);
        info!("{:>25}{:>10}", "commits:", self.nb_commits);
        info!("{:>25}{:>10}", "failures:", self.nb_failures);
        info!("{:>25}{:>10}", "backjumps:", self.nb_backjumps);
        info!("{:>25}{:>10}", "unassigned:", self.nb_unassigned);
        info!("{:>25}{:>10}", "max depth:", self.max_depth);
        info!("{:>25}{:>10.3}", "time (s):", self.time_searched);
    }
}
