pub mod discovery;
pub mod graph_builder;
pub mod list;

// Re-export commonly used types
pub use discovery::{DiscoveryReport, WireSplit};
pub use graph_builder::GraphBuilder;
pub use list::{ConnectionList, Link};
