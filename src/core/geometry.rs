//! Port geometry resolver
//!
//! Maps a component's anchor, rotation and canonical footprint to the grid
//! cells its body occupies and the (cell, side) slots of its ports. All
//! functions here are pure.

use crate::core::components::kind::{ComponentKind, LocalPort};
use crate::core::components::port_specs::{PortDirection, PortSpec};
use crate::core::grid::Placeholder;
use crate::core::types::{Cell, ComponentId, Footprint, Rotation, Side};

/// A port resolved to absolute grid coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPort {
    pub cell: Cell,
    pub side: Side,
    pub spec: PortSpec,
}

/// Every cell and slot a placed component claims
#[derive(Debug, Clone, Default)]
pub struct ComponentSpace {
    /// Cells whose four slots are all body slots
    pub body: Vec<Cell>,
    pub ports: Vec<ResolvedPort>,
}

impl ComponentSpace {
    /// Distinct cells covered by body and ports, sorted
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .body
            .iter()
            .copied()
            .chain(self.ports.iter().map(|p| p.cell))
            .collect();
        cells.sort();
        cells.dedup();
        cells
    }

    /// Slots to register in the placeholder grid for this component
    pub fn slots(&self, id: ComponentId) -> Vec<(Cell, Side, Placeholder)> {
        let mut slots = Vec::with_capacity(self.body.len() * 4 + self.ports.len());
        for cell in &self.body {
            for side in Side::ALL {
                slots.push((*cell, side, Placeholder::body(id)));
            }
        }
        for port in &self.ports {
            slots.push((port.cell, port.side, Placeholder::port(id, port.spec.clone())));
        }
        slots
    }

    pub fn ports_in(&self, direction: PortDirection) -> impl Iterator<Item = &ResolvedPort> {
        self.ports.iter().filter(move |p| p.spec.direction == direction)
    }
}

/// Map canonical local coordinates into the rotated local frame
pub fn rotate_local(canonical: Footprint, rotation: Rotation, row: i64, col: i64) -> (i64, i64) {
    let (rows, cols) = (canonical.rows as i64, canonical.cols as i64);
    match rotation {
        Rotation::Deg0 => (row, col),
        Rotation::Deg90 => (col, rows - 1 - row),
        Rotation::Deg180 => (rows - 1 - row, cols - 1 - col),
        Rotation::Deg270 => (cols - 1 - col, row),
    }
}

fn place_local(canonical: Footprint, anchor: Cell, rotation: Rotation, row: i64, col: i64) -> Cell {
    let (r, c) = rotate_local(canonical, rotation, row, col);
    Cell::new(anchor.row + r, anchor.col + c)
}

/// Resolve a single canonical port for the given placement
pub fn resolve_port(kind: &ComponentKind, anchor: Cell, rotation: Rotation, port: &LocalPort) -> ResolvedPort {
    let canonical = kind.canonical_footprint();
    ResolvedPort {
        cell: place_local(canonical, anchor, rotation, port.row, port.col),
        side: port.side.rotated(rotation.quarter_turns()),
        spec: port.spec.clone(),
    }
}

/// Locate a port by direction and positional index
pub fn port_at(
    kind: &ComponentKind,
    anchor: Cell,
    rotation: Rotation,
    direction: PortDirection,
    index: usize,
) -> Option<ResolvedPort> {
    kind.canonical_ports()
        .iter()
        .find(|p| p.spec.direction == direction && p.spec.index == index)
        .map(|p| resolve_port(kind, anchor, rotation, p))
}

/// Resolve the full component space for a placement
pub fn resolve(kind: &ComponentKind, anchor: Cell, rotation: Rotation) -> ComponentSpace {
    let canonical = kind.canonical_footprint();
    let body = if kind.is_wire() {
        Vec::new()
    } else {
        let mut cells = Vec::with_capacity(canonical.rows * canonical.cols);
        for row in 0..canonical.rows as i64 {
            for col in 0..canonical.cols as i64 {
                cells.push(place_local(canonical, anchor, rotation, row, col));
            }
        }
        cells.sort();
        cells
    };
    let ports = kind
        .canonical_ports()
        .iter()
        .map(|p| resolve_port(kind, anchor, rotation, p))
        .collect();
    ComponentSpace { body, ports }
}

/// Cells of a wire in segment order, index `i` being the wire offset `i`
pub fn wire_cells(length: usize, anchor: Cell, rotation: Rotation) -> Vec<Cell> {
    let canonical = Footprint::new(1, length);
    (0..length as i64)
        .map(|i| place_local(canonical, anchor, rotation, 0, i))
        .collect()
}
