use crate::graph::NodeId;

/** how repeated entries of the conflict log are handled */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// every blocked candidate logs its blocking node, even if already logged
    KeepDuplicates,
    /// a node appears at most once, at the position of its most recent recording
    KeepMostRecent,
}

impl Default for ConflictPolicy {
    fn default() -> Self { ConflictPolicy::KeepDuplicates }
}


/**
Ordered log of the nodes that blocked the candidates of the current assignment
attempt. The most recent entry is the first backjump target.
*/
#[derive(Debug, Clone, Default)]
pub struct ConflictLog {
    entries: Vec<NodeId>,
    policy: ConflictPolicy,
}

impl ConflictLog {
    /// creates an empty log
    pub fn new(policy:ConflictPolicy) -> Self {
        Self { entries: Vec::new(), policy }
    }

    /// records that v blocked a candidate
    pub fn record(&mut self, v:NodeId) {
        if self.policy == ConflictPolicy::KeepMostRecent {
            self.entries.retain(|u| *u != v);
        }
        self.entries.push(v);
    }

    /// removes and returns the most recent entry
    pub fn pop(&mut self) -> Option<NodeId> { self.entries.pop() }

    /// empties the log
    pub fn clear(&mut self) { self.entries.clear(); }

    /// true if the log is empty
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// number of entries
    pub fn len(&self) -> usize { self.entries.len() }

    /// entries, oldest first
    pub fn entries(&self) -> &[NodeId] { &self.entries }

    /// duplicate handling policy
    pub fn policy(&self) -> ConflictPolicy { self.policy }
}
