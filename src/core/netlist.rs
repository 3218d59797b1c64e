use crate::core::components::component::Component;
use crate::core::components::kind::ComponentKind;
use crate::core::components::port_specs::PortDirection;
use crate::core::connections::list::ConnectionList;
use crate::core::errors::PlacementError;
use crate::core::geometry::{self, ComponentSpace};
use crate::core::grid::PlaceholderGrid;
use crate::core::types::{Cell, ComponentId, Rotation, Side};
use log::trace;
use std::collections::{BTreeMap, HashMap};

/// Selects one of a component's connection lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Inputs,
    Outputs,
    Connections,
}

impl From<PortDirection> for ListKind {
    fn from(direction: PortDirection) -> Self {
        match direction {
            PortDirection::Input => ListKind::Inputs,
            PortDirection::Output => ListKind::Outputs,
            PortDirection::Wire => ListKind::Connections,
        }
    }
}

/// Component table plus the placeholder grid they are registered in
///
/// Components refer to each other by id only; every cross-reference is
/// resolved through this table.
#[derive(Debug, Clone)]
pub struct Netlist {
    pub(crate) grid: PlaceholderGrid,
    pub(crate) components: BTreeMap<ComponentId, Component>,
    next_id: u64,
    /// Wire id -> the two halves it was split into
    splits: HashMap<ComponentId, (ComponentId, ComponentId)>,
}

impl Netlist {
    pub fn new(grid_rows: usize, grid_cols: usize) -> Self {
        Self {
            grid: PlaceholderGrid::new(grid_rows, grid_cols),
            components: BTreeMap::new(),
            next_id: 1,
            splits: HashMap::new(),
        }
    }

    pub fn grid(&self) -> &PlaceholderGrid {
        &self.grid
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Vec<ComponentId> {
        self.components.keys().copied().collect()
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Follow wire splits until reaching a live component id
    pub fn current_id(&self, mut id: ComponentId) -> ComponentId {
        while let Some((first, _)) = self.splits.get(&id) {
            id = *first;
        }
        id
    }

    pub(crate) fn record_split(&mut self, original: ComponentId, halves: (ComponentId, ComponentId)) {
        self.splits.insert(original, halves);
    }

    /// Verify every slot of a space is inside the grid and unclaimed
    pub fn check_space(&self, space: &ComponentSpace) -> Result<(), PlacementError> {
        for cell in &space.body {
            for side in Side::ALL {
                self.grid.check_free(*cell, side)?;
            }
        }
        for port in &space.ports {
            self.grid.check_free(port.cell, port.side)?;
        }
        Ok(())
    }

    /// Reject anchors off the grid before resolving geometry from them
    fn check_anchor(&self, anchor: Cell) -> Result<(), PlacementError> {
        if self.grid.in_bounds(anchor) {
            Ok(())
        } else {
            Err(PlacementError::OutOfBounds {
                cell: anchor,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            })
        }
    }

    /// Create a component and claim its slots; connections are left to
    /// discovery
    pub fn insert(
        &mut self,
        kind: ComponentKind,
        anchor: Cell,
        rotation: Rotation,
        programmed: Vec<u64>,
    ) -> Result<ComponentId, PlacementError> {
        kind.validate()?;
        self.check_anchor(anchor)?;
        let space = geometry::resolve(&kind, anchor, rotation);
        self.check_space(&space)?;

        let id = ComponentId(self.next_id);
        self.next_id += 1;
        self.components
            .insert(id, Component::new(id, kind, anchor, rotation, programmed));
        self.register(id)?;
        Ok(id)
    }

    /// Claim the grid slots of an existing component at its current anchor
    pub(crate) fn register(&mut self, id: ComponentId) -> Result<(), PlacementError> {
        let Some(component) = self.components.get(&id) else {
            return Ok(());
        };
        for (cell, side, entry) in component.space().slots(id) {
            self.grid.set(cell, side, entry)?;
        }
        trace!("registered {} {} at {}", component.kind, id, component.anchor);
        Ok(())
    }

    /// Release the grid slots of a component and drop all of its links,
    /// mirrored into its peers
    pub(crate) fn unregister(&mut self, id: ComponentId) {
        let Some(component) = self.components.get(&id) else {
            return;
        };
        for (cell, side, _) in component.space().slots(id) {
            if self.grid.get(cell, side).map(|e| e.component) == Some(id) {
                self.grid.clear(cell, side);
            }
        }
        self.unlink_all(id);
    }

    /// Remove a component from the table, releasing everything it held
    pub fn remove(&mut self, id: ComponentId) -> Option<Component> {
        self.unregister(id);
        self.components.remove(&id)
    }

    /// Move a component to a new anchor, keeping its id, state and memory
    ///
    /// On rejection the component is re-registered where it was; its links
    /// are gone either way and must be rediscovered by the caller.
    pub(crate) fn relocate(&mut self, id: ComponentId, anchor: Cell) -> Result<(), PlacementError> {
        let Some(component) = self.components.get(&id) else {
            return Ok(());
        };
        self.check_anchor(anchor)?;
        let space = geometry::resolve(&component.kind, anchor, component.rotation);
        self.unregister(id);
        if let Err(error) = self.check_space(&space) {
            self.register(id)?;
            return Err(error);
        }
        if let Some(component) = self.components.get_mut(&id) {
            component.anchor = anchor;
        }
        self.register(id)
    }

    pub(crate) fn list_mut(&mut self, id: ComponentId, list: ListKind) -> Option<&mut ConnectionList> {
        self.components.get_mut(&id).map(|c| match list {
            ListKind::Inputs => &mut c.inputs,
            ListKind::Outputs => &mut c.outputs,
            ListKind::Connections => &mut c.connections,
        })
    }

    pub fn list(&self, id: ComponentId, list: ListKind) -> Option<&ConnectionList> {
        self.components.get(&id).map(|c| match list {
            ListKind::Inputs => &c.inputs,
            ListKind::Outputs => &c.outputs,
            ListKind::Connections => &c.connections,
        })
    }

    /// Record a connection on both sides
    pub(crate) fn link(
        &mut self,
        a: ComponentId,
        a_list: ListKind,
        a_index: Option<usize>,
        b: ComponentId,
        b_list: ListKind,
        b_index: Option<usize>,
    ) {
        if let Some(list) = self.list_mut(a, a_list) {
            list.add(b, a_index);
        }
        if let Some(list) = self.list_mut(b, b_list) {
            list.add(a, b_index);
        }
    }

    /// Record a named connection on both sides without overwriting roles
    /// that are already bound
    pub(crate) fn link_named(&mut self, a: ComponentId, b: ComponentId, role: &str) {
        if let Some(component) = self.components.get_mut(&a) {
            component.named.entry(role.to_string()).or_insert(b);
        }
        if let Some(component) = self.components.get_mut(&b) {
            component.named.entry(role.to_string()).or_insert(a);
        }
    }

    /// Drop every link between `a` and `b` on both sides, named roles
    /// included; returns `true` if anything was removed
    pub fn unlink(&mut self, a: ComponentId, b: ComponentId) -> bool {
        let mut removed = false;
        for (from, to) in [(a, b), (b, a)] {
            if let Some(component) = self.components.get_mut(&from) {
                removed |= component.inputs.remove(to);
                removed |= component.outputs.remove(to);
                removed |= component.connections.remove(to);
                let named = component.named.len();
                component.named.retain(|_, bound| *bound != to);
                removed |= component.named.len() != named;
            }
        }
        if removed {
            trace!("unlinked {} and {}", a, b);
        }
        removed
    }

    /// Clear every list of `id` and remove the back-references its peers
    /// hold
    pub(crate) fn unlink_all(&mut self, id: ComponentId) {
        let Some(component) = self.components.get(&id) else {
            return;
        };
        let mut peers: Vec<ComponentId> = component
            .inputs
            .get()
            .chain(component.outputs.get())
            .chain(component.connections.get())
            .chain(component.named.values().copied())
            .collect();
        peers.sort();
        peers.dedup();
        for peer in peers {
            self.unlink(id, peer);
        }
    }

    /// Drop every link in the table without touching the grid
    pub(crate) fn clear_all_links(&mut self) {
        for component in self.components.values_mut() {
            component.inputs.clear();
            component.outputs.clear();
            component.connections.clear();
            component.named.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::kind::GateOp;

    #[test]
    fn test_insert_claims_slots_and_rejects_overlap() {
        let mut netlist = Netlist::new(16, 16);
        let gate = netlist
            .insert(ComponentKind::gate(GateOp::And, 2), Cell::new(2, 2), Rotation::Deg0, vec![])
            .unwrap();
        // 6 body cells, 2 inputs, 1 output
        assert_eq!(netlist.grid().occupied_slots(), 6 * 4 + 3);

        let overlap = netlist.insert(ComponentKind::Led, Cell::new(3, 3), Rotation::Deg0, vec![]);
        assert!(matches!(overlap, Err(PlacementError::Occupied { occupant, .. }) if occupant == gate));

        let outside = netlist.insert(ComponentKind::Switch, Cell::new(0, 15), Rotation::Deg0, vec![]);
        assert!(matches!(outside, Err(PlacementError::OutOfBounds { .. })));
        assert_eq!(netlist.len(), 1);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut netlist = Netlist::new(8, 8);
        let a = netlist.insert(ComponentKind::Led, Cell::new(0, 1), Rotation::Deg0, vec![]).unwrap();
        netlist.remove(a);
        let b = netlist.insert(ComponentKind::Led, Cell::new(0, 1), Rotation::Deg0, vec![]).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_relocate_restores_on_collision() {
        let mut netlist = Netlist::new(8, 8);
        let led = netlist.insert(ComponentKind::Led, Cell::new(0, 1), Rotation::Deg0, vec![]).unwrap();
        netlist.insert(ComponentKind::Led, Cell::new(4, 1), Rotation::Deg0, vec![]).unwrap();
        let before = netlist.grid().occupied_slots();

        let blocked = netlist.relocate(led, Cell::new(4, 1));
        assert!(matches!(blocked, Err(PlacementError::Occupied { .. })));
        assert_eq!(netlist.get(led).unwrap().anchor(), Cell::new(0, 1));
        assert_eq!(netlist.grid().occupied_slots(), before);

        netlist.relocate(led, Cell::new(2, 3)).unwrap();
        assert_eq!(netlist.get(led).unwrap().anchor(), Cell::new(2, 3));
        assert!(netlist.grid().get(Cell::new(0, 1), Side::Top).is_none());
        assert_eq!(netlist.grid().occupied_slots(), before);
    }

    #[test]
    fn test_extreme_anchors_are_out_of_bounds() {
        let mut netlist = Netlist::new(8, 8);
        for anchor in [Cell::new(0, i64::MAX), Cell::new(i64::MIN, 0), Cell::new(i64::MAX, i64::MAX)] {
            let placed = netlist.insert(ComponentKind::gate(GateOp::Or, 3), anchor, Rotation::Deg90, vec![]);
            assert!(matches!(placed, Err(PlacementError::OutOfBounds { cell, .. }) if cell == anchor));
        }

        let led = netlist.insert(ComponentKind::Led, Cell::new(0, 1), Rotation::Deg0, vec![]).unwrap();
        let moved = netlist.relocate(led, Cell::new(i64::MIN, i64::MIN));
        assert!(matches!(moved, Err(PlacementError::OutOfBounds { .. })));
        assert_eq!(netlist.get(led).unwrap().anchor(), Cell::new(0, 1));
        assert_eq!(netlist.grid().occupied_slots(), 4 + 1);
    }

    #[test]
    fn test_unlink_drops_one_peer_on_both_sides() {
        let mut netlist = Netlist::new(8, 8);
        let switch = netlist.insert(ComponentKind::Switch, Cell::new(0, 0), Rotation::Deg0, vec![]).unwrap();
        let led = netlist.insert(ComponentKind::Led, Cell::new(0, 2), Rotation::Deg0, vec![]).unwrap();
        let other = netlist.insert(ComponentKind::Led, Cell::new(4, 2), Rotation::Deg0, vec![]).unwrap();
        netlist.link(switch, ListKind::Outputs, Some(0), led, ListKind::Inputs, Some(0));
        netlist.link(switch, ListKind::Outputs, Some(0), other, ListKind::Inputs, Some(0));
        netlist.link_named(switch, led, "clk");

        assert!(netlist.unlink(led, switch));
        let source = netlist.get(switch).unwrap();
        assert!(!source.outputs().contains(led));
        assert!(source.outputs().contains(other));
        assert!(source.named_connections().is_empty());
        let sink = netlist.get(led).unwrap();
        assert!(sink.inputs().is_empty());
        assert!(sink.named_connections().is_empty());
        assert!(netlist.get(other).unwrap().inputs().contains(switch));

        assert!(!netlist.unlink(led, switch));
    }

    #[test]
    fn test_unlink_all_mirrors_removal() {
        let mut netlist = Netlist::new(8, 8);
        let a = netlist.insert(ComponentKind::Switch, Cell::new(0, 0), Rotation::Deg0, vec![]).unwrap();
        let b = netlist.insert(ComponentKind::Led, Cell::new(0, 2), Rotation::Deg0, vec![]).unwrap();
        netlist.link(a, ListKind::Outputs, Some(0), b, ListKind::Inputs, Some(0));
        netlist.link_named(a, b, "clk");

        netlist.remove(a);
        let led = netlist.get(b).unwrap();
        assert!(led.inputs().is_empty());
        assert!(led.named_connections().is_empty());
        assert_eq!(netlist.grid().occupied_slots(), 4 + 1);
    }
}
