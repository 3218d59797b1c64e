use crate::core::types::{Cell, ComponentId, Side};
use thiserror::Error;

/// Rejections raised while placing or moving a component
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cell {cell} side {side:?} is already occupied by component {occupant}")]
    Occupied {
        cell: Cell,
        side: Side,
        occupant: ComponentId,
    },
    #[error("cell {cell} lies outside the {rows}x{cols} grid")]
    OutOfBounds { cell: Cell, rows: usize, cols: usize },
    #[error("invalid component shape: {0}")]
    InvalidShape(String),
}

/// Schematic topologies that cannot be simulated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("two drivers on one wire: {first} and {second}")]
    DriverConflict {
        first: ComponentId,
        second: ComponentId,
    },
    #[error("driver {driver} connected to the output of gate {gate}")]
    DriverIntoGateOutput {
        driver: ComponentId,
        gate: ComponentId,
    },
}

/// Failures raised while propagating a driver change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    #[error("unstable loop: propagation from {driver} exceeded {limit} steps")]
    UnstableLoop { driver: ComponentId, limit: usize },
}

/// Errors surfaced by the session entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
    #[error("schematic has {} topology error(s)", .0.len())]
    Topology(Vec<TopologyError>),
    #[error("component {0} not found")]
    UnknownComponent(ComponentId),
    #[error("component {0} is not a {1}")]
    WrongKind(ComponentId, &'static str),
    #[error("simulation unavailable: the connection graph is stale or failed to build")]
    SimulationUnavailable,
}

impl From<Vec<TopologyError>> for SessionError {
    fn from(errors: Vec<TopologyError>) -> Self {
        SessionError::Topology(errors)
    }
}
