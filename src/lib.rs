pub mod core;

// Re-export commonly used types
pub use crate::core::components::{Component, ComponentKind, GateOp};
pub use crate::core::errors::{PlacementError, PropagationError, SessionError, TopologyError};
pub use crate::core::execution::SessionConfig;
pub use crate::core::schematic::SchematicRecord;
pub use crate::core::session::{GraphStatus, Session};
pub use crate::core::types::{Cell, ComponentId, Level, Rotation, State};
