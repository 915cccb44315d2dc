use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::Time;

#[derive(Copy, Clone, Eq, PartialEq)]
pub(super) struct State {
    pub(super) cost: Time,
    pub(super) node: NodeIndex,
}

// Min-heap on cost; node index breaks ties so pops are deterministic
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
