pub mod config;
pub mod propagation;

// Re-export commonly used types
pub use config::SessionConfig;
pub use propagation::{PropagationEngine, PropagationReport};
