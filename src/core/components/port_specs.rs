use serde::{Deserialize, Serialize};

/// Which connection list a port feeds during discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
    /// Undirected wire stub; direction is decided by the graph builder
    Wire,
}

/// Port specification attached to a connectable grid slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSpec {
    pub direction: PortDirection,
    /// Position among the ports of the same direction; for wires, the cell
    /// offset along the segment
    pub index: usize,
    /// Semantic role for ports that are addressed by name
    pub role: Option<String>,
}

impl PortSpec {
    pub fn input(index: usize) -> Self {
        Self {
            direction: PortDirection::Input,
            index,
            role: None,
        }
    }

    pub fn output(index: usize) -> Self {
        Self {
            direction: PortDirection::Output,
            index,
            role: None,
        }
    }

    pub fn wire(offset: usize) -> Self {
        Self {
            direction: PortDirection::Wire,
            index: offset,
            role: None,
        }
    }

    /// Attach a role name to this port
    pub fn named(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }
}

/// Role names shared by the named-port components
pub mod roles {
    pub const CLOCK: &str = "clk";
    pub const Q: &str = "q";
    pub const Q_BAR: &str = "qbar";
    pub const CHIP_SELECT: &str = "cs";

    /// Role name of the k-th multiplexer select line
    pub fn select(k: usize) -> String {
        format!("sel{}", k)
    }
}
