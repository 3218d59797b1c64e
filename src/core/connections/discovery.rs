//! Connection discovery
//!
//! Ports connect when connectable stubs of two different components share a
//! grid cell. A component holding both a side and its opposite in a cell
//! passes straight through it; two pass-throughs crossing in one cell stay
//! unconnected, while a stub landing on the pass-through cell of a wire
//! splits that wire there.

use crate::core::components::kind::ComponentKind;
use crate::core::components::port_specs::PortSpec;
use crate::core::errors::PlacementError;
use crate::core::geometry;
use crate::core::netlist::{ListKind, Netlist};
use crate::core::types::{Cell, ComponentId, Rotation, Side};
use log::{debug, trace};
use std::collections::HashSet;

/// A wire replaced by two halves meeting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSplit {
    pub original: ComponentId,
    pub offset: usize,
    pub halves: (ComponentId, ComponentId),
}

/// Outcome of discovering one component
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// New links recorded (each counted once, not per side)
    pub links: usize,
    pub splits: Vec<WireSplit>,
}

impl DiscoveryReport {
    fn absorb(&mut self, other: DiscoveryReport) {
        self.links += other.links;
        self.splits.extend(other.splits);
    }
}

fn passes_through(netlist: &Netlist, id: ComponentId, cell: Cell, side: Side) -> bool {
    netlist.grid.get(cell, side).map(|e| e.component) == Some(id)
        && netlist.grid.get(cell, side.opposite()).map(|e| e.component) == Some(id)
}

impl Netlist {
    /// Link a component to every adjacent connectable port and split any
    /// wire it branches off from
    pub fn discover(&mut self, id: ComponentId) -> Result<DiscoveryReport, PlacementError> {
        let Some(component) = self.get(id) else {
            return Ok(DiscoveryReport::default());
        };
        let is_wire = component.is_wire();
        let ports = component.space().ports;

        let mut report = DiscoveryReport::default();
        // (wire, offset) pairs to split once scanning is done
        let mut pending: Vec<(ComponentId, usize)> = Vec::new();

        for port in &ports {
            let own_passes = passes_through(self, id, port.cell, port.side);
            let mut matched_here: HashSet<ComponentId> = HashSet::new();

            for side in Side::ALL {
                if side == port.side {
                    continue;
                }
                let Some(entry) = self.grid.get(port.cell, side) else {
                    continue;
                };
                let peer = entry.component;
                if peer == id || !entry.connectable {
                    continue;
                }
                let Some(peer_spec) = entry.port.clone() else {
                    continue;
                };
                // a pass-through peer holds this side and its opposite; only
                // the first of the pair is considered
                if !matched_here.insert(peer) {
                    continue;
                }
                let peer_passes = passes_through(self, peer, port.cell, side);
                if own_passes && peer_passes {
                    trace!("{} crosses {} at {} without connecting", id, peer, port.cell);
                    continue;
                }

                let own_list = if is_wire {
                    ListKind::Connections
                } else {
                    ListKind::from(port.spec.direction)
                };
                let already = self
                    .list(id, own_list)
                    .map(|list| list.contains(peer))
                    .unwrap_or(false);
                if !already {
                    self.connect_ports(id, own_list, &port.spec, peer, &peer_spec);
                    report.links += 1;
                }

                if peer_passes && self.get(peer).map(|c| c.is_wire()).unwrap_or(false) {
                    pending.push((peer, peer_spec.index));
                } else if own_passes && is_wire {
                    pending.push((id, port.spec.index));
                }
            }
        }

        let mut split_done: HashSet<ComponentId> = HashSet::new();
        for (wire, offset) in pending {
            if !split_done.insert(wire) || !self.contains(wire) {
                continue;
            }
            let nested = self.split_wire(wire, offset)?;
            report.absorb(nested);
        }
        Ok(report)
    }

    fn connect_ports(
        &mut self,
        id: ComponentId,
        own_list: ListKind,
        own_spec: &PortSpec,
        peer: ComponentId,
        peer_spec: &PortSpec,
    ) {
        let peer_is_wire = self.get(peer).map(|c| c.is_wire()).unwrap_or(false);
        let peer_list = if peer_is_wire {
            ListKind::Connections
        } else {
            ListKind::from(peer_spec.direction)
        };
        self.link(id, own_list, Some(own_spec.index), peer, peer_list, Some(peer_spec.index));
        for role in [own_spec.role.as_deref(), peer_spec.role.as_deref()].into_iter().flatten() {
            self.link_named(id, peer, role);
        }
        trace!("linked {} port {} with {} port {}", id, own_spec.index, peer, peer_spec.index);
    }

    /// Replace a wire with two wires meeting at `offset`, then rediscover
    /// both halves
    pub fn split_wire(&mut self, wire: ComponentId, offset: usize) -> Result<DiscoveryReport, PlacementError> {
        let Some(component) = self.get(wire) else {
            return Ok(DiscoveryReport::default());
        };
        let ComponentKind::Wire { length } = *component.kind() else {
            return Ok(DiscoveryReport::default());
        };
        if offset == 0 || offset + 1 >= length {
            return Ok(DiscoveryReport::default());
        }
        let rotation = component.rotation();
        let cells = geometry::wire_cells(length, component.anchor(), rotation);

        self.remove(wire);
        let first = self.insert_wire_over(&cells[..=offset], rotation)?;
        let second = self.insert_wire_over(&cells[offset..], rotation)?;
        self.record_split(wire, (first, second));
        debug!("split wire {} at offset {} into {} and {}", wire, offset, first, second);

        let mut report = DiscoveryReport::default();
        report.splits.push(WireSplit {
            original: wire,
            offset,
            halves: (first, second),
        });
        report.absorb(self.discover(first)?);
        if self.contains(second) {
            report.absorb(self.discover(second)?);
        }
        Ok(report)
    }

    fn insert_wire_over(
        &mut self,
        cells: &[Cell],
        rotation: Rotation,
    ) -> Result<ComponentId, PlacementError> {
        let anchor = Cell::new(
            cells.iter().map(|c| c.row).min().unwrap_or_default(),
            cells.iter().map(|c| c.col).min().unwrap_or_default(),
        );
        self.insert(ComponentKind::Wire { length: cells.len() }, anchor, rotation, Vec::new())
    }

    /// Rebuild every link from the grid
    pub fn discover_all(&mut self) -> Result<DiscoveryReport, PlacementError> {
        self.clear_all_links();
        let mut report = DiscoveryReport::default();
        for id in self.ids() {
            if self.contains(id) {
                report.absorb(self.discover(id)?);
            }
        }
        Ok(report)
    }
}
