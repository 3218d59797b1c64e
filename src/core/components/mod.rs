pub mod component;
pub mod kind;
pub mod logic;
pub mod port_specs;

// Re-export commonly used types
pub use component::{Component, Memory, DISPLAY_CAPACITY};
pub use kind::{ComponentKind, GateOp};
pub use port_specs::{roles, PortDirection, PortSpec};
