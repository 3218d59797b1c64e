pub mod components;
pub mod connections;
pub mod errors;
pub mod execution;
pub mod geometry;
pub mod grid;
pub mod netlist;
pub mod schematic;
pub mod session;
pub mod types;

#[cfg(test)]
mod tests;
