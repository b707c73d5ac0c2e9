//! Graph coloring CSP solved by a degree-ordered backjumping search

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// error types
pub mod error;

/// constraint graph (nodes and "must differ" constraints)
pub mod graph;

/// color domain, colorings and checker
pub mod color;

/// read DIMACS formats
pub mod dimacs;

/// coloring problems (instance formats, bundled and random instances)
pub mod instance;

/// helper and utility methods for executables
pub mod util;

/// search for the graph coloring CSP
pub mod search;
