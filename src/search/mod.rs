//! Backjumping search for the graph coloring CSP.

/// assigned/unassigned partition and live domains
pub mod assignment;

/// log of the nodes blocking an assignment attempt
pub mod conflicts;

/// search counters
pub mod statistics;

/// degree-ordered backtracking with conflict-directed backjumping
pub mod backjumping;
