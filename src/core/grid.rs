use crate::core::components::port_specs::PortSpec;
use crate::core::errors::PlacementError;
use crate::core::types::{Cell, ComponentId, Side};

/// Occupancy record for one (row, col, side) slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub component: ComponentId,
    pub connectable: bool,
    /// Port carried by this slot; `None` for body slots
    pub port: Option<PortSpec>,
}

impl Placeholder {
    pub fn body(component: ComponentId) -> Self {
        Self {
            component,
            connectable: false,
            port: None,
        }
    }

    pub fn port(component: ComponentId, port: PortSpec) -> Self {
        Self {
            component,
            connectable: true,
            port: Some(port),
        }
    }

    pub fn role(&self) -> Option<&str> {
        self.port.as_ref().and_then(|p| p.role.as_deref())
    }
}

type Slots = [Option<Placeholder>; 4];

/// Spatial index over grid cells, four directional slots per cell
///
/// The grid is a plain lookup table. It refuses to overwrite an occupied
/// slot but performs no electrical validation.
#[derive(Debug, Clone)]
pub struct PlaceholderGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Slots>,
}

impl PlaceholderGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Default::default(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.col >= 0 && (cell.row as usize) < self.rows && (cell.col as usize) < self.cols
    }

    fn offset(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.row as usize * self.cols + cell.col as usize)
    }

    /// Claim a slot; a second claim on the same slot is rejected
    pub fn set(&mut self, cell: Cell, side: Side, entry: Placeholder) -> Result<(), PlacementError> {
        let (rows, cols) = (self.rows, self.cols);
        let offset = self
            .offset(cell)
            .ok_or(PlacementError::OutOfBounds { cell, rows, cols })?;
        let slot = &mut self.cells[offset][side.index()];
        if let Some(existing) = slot {
            return Err(PlacementError::Occupied {
                cell,
                side,
                occupant: existing.component,
            });
        }
        *slot = Some(entry);
        Ok(())
    }

    pub fn get(&self, cell: Cell, side: Side) -> Option<&Placeholder> {
        self.offset(cell)
            .and_then(|offset| self.cells[offset][side.index()].as_ref())
    }

    /// Release a slot, returning whatever occupied it
    pub fn clear(&mut self, cell: Cell, side: Side) -> Option<Placeholder> {
        let offset = self.offset(cell)?;
        self.cells[offset][side.index()].take()
    }

    /// Check that a slot could be claimed without committing anything
    pub fn check_free(&self, cell: Cell, side: Side) -> Result<(), PlacementError> {
        if !self.in_bounds(cell) {
            return Err(PlacementError::OutOfBounds {
                cell,
                rows: self.rows,
                cols: self.cols,
            });
        }
        match self.get(cell, side) {
            Some(existing) => Err(PlacementError::Occupied {
                cell,
                side,
                occupant: existing.component,
            }),
            None => Ok(()),
        }
    }

    /// Number of occupied slots, mostly useful for tests
    pub fn occupied_slots(&self) -> usize {
        self.cells
            .iter()
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .sum()
    }
}
