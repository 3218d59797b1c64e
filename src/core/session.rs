//! Simulation session
//!
//! The session owns the grid, the component table and the propagation
//! engine, and is the only way callers mutate them. Placement, movement and
//! deletion keep connections current incrementally; any of them marks the
//! directional graph stale, and driver operations are refused until
//! `build_graph` succeeds again.

use crate::core::components::component::Component;
use crate::core::components::kind::ComponentKind;
use crate::core::connections::graph_builder::GraphBuilder;
use crate::core::errors::{SessionError, TopologyError};
use crate::core::execution::config::SessionConfig;
use crate::core::execution::propagation::{PropagationEngine, PropagationReport};
use crate::core::grid::PlaceholderGrid;
use crate::core::netlist::Netlist;
use crate::core::schematic::SchematicRecord;
use crate::core::types::{Cell, ComponentId, Level, Rotation, State};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Whether the directional graph matches the placed schematic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphStatus {
    /// Topology changed since the last build
    Stale,
    Ready,
    Failed(Vec<TopologyError>),
}

pub struct Session {
    config: SessionConfig,
    netlist: Netlist,
    engine: PropagationEngine,
    graph: GraphStatus,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            netlist: Netlist::new(config.grid_rows, config.grid_cols),
            engine: PropagationEngine::new(config.max_propagation_steps),
            graph: GraphStatus::Stale,
            config,
        }
    }

    /// Rebuild a session from saved records
    ///
    /// Records are placed in order, then the graph is built and every
    /// driver settled. Returns the session with a map from saved ids to the
    /// ids assigned now. A topology failure leaves the session loaded with
    /// simulation unavailable.
    pub fn load(
        config: SessionConfig,
        records: &[SchematicRecord],
    ) -> Result<(Session, BTreeMap<u64, ComponentId>), SessionError> {
        let mut session = Session::new(config);
        let mut placed = Vec::with_capacity(records.len());
        for record in records {
            let id = session.place_programmed(
                record.kind.clone(),
                record.row,
                record.col,
                record.rotation,
                record.programmed_data.clone().unwrap_or_default(),
            )?;
            placed.push((record.id, id));
        }
        let ids = placed
            .into_iter()
            .map(|(saved, id)| (saved, session.netlist.current_id(id)))
            .collect();

        match session.build_graph() {
            Ok(()) => {
                if let Err(error) = session.settle() {
                    warn!("loaded schematic did not settle: {}", error);
                }
            }
            Err(error) => warn!("loaded schematic cannot be simulated: {}", error),
        }
        info!("loaded {} records into {} components", records.len(), session.netlist.len());
        Ok((session, ids))
    }

    /// Export the schematic in id order
    pub fn records(&self) -> Vec<SchematicRecord> {
        self.netlist.components().map(SchematicRecord::from).collect()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn graph_status(&self) -> &GraphStatus {
        &self.graph
    }

    /// True when driver operations are accepted
    pub fn is_simulating(&self) -> bool {
        self.graph == GraphStatus::Ready
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    pub fn grid(&self) -> &PlaceholderGrid {
        self.netlist.grid()
    }

    /// Place a component and connect it to its neighbours
    ///
    /// A wire placed across the end of another port is split on the spot;
    /// the id returned is then the id of its first half.
    pub fn place(
        &mut self,
        kind: ComponentKind,
        row: i64,
        col: i64,
        rotation: Rotation,
    ) -> Result<ComponentId, SessionError> {
        self.place_programmed(kind, row, col, rotation, Vec::new())
    }

    /// Place a component with programmed words (PROM contents)
    pub fn place_programmed(
        &mut self,
        kind: ComponentKind,
        row: i64,
        col: i64,
        rotation: Rotation,
        programmed: Vec<u64>,
    ) -> Result<ComponentId, SessionError> {
        let id = self.netlist.insert(kind, Cell::new(row, col), rotation, programmed)?;
        let report = self.netlist.discover(id)?;
        self.graph = GraphStatus::Stale;
        let id = self.netlist.current_id(id);
        debug!(
            "placed {} at ({}, {}): {} links, {} splits",
            id,
            row,
            col,
            report.links,
            report.splits.len()
        );
        Ok(id)
    }

    /// Move a component, keeping its id unless it is a wire that gets split
    ///
    /// A rejected move leaves the component where it was.
    pub fn move_to(&mut self, id: ComponentId, row: i64, col: i64) -> Result<ComponentId, SessionError> {
        self.require(id)?;
        self.graph = GraphStatus::Stale;
        let moved = self.netlist.relocate(id, Cell::new(row, col));
        self.netlist.discover(id)?;
        moved?;
        debug!("moved {} to ({}, {})", id, row, col);
        Ok(self.netlist.current_id(id))
    }

    /// Remove a component and every link to it
    pub fn delete(&mut self, id: ComponentId) -> Result<Component, SessionError> {
        let removed = self.netlist.remove(id).ok_or(SessionError::UnknownComponent(id))?;
        self.graph = GraphStatus::Stale;
        debug!("deleted {} {}", removed.kind(), id);
        Ok(removed)
    }

    /// Rediscover every connection and derive directional edges from each
    /// driver
    pub fn build_graph(&mut self) -> Result<(), SessionError> {
        self.netlist.discover_all()?;
        match GraphBuilder::build(&mut self.netlist) {
            Ok(()) => {
                self.graph = GraphStatus::Ready;
                debug!("graph ready over {} components", self.netlist.len());
                Ok(())
            }
            Err(errors) => {
                self.graph = GraphStatus::Failed(errors.clone());
                Err(SessionError::Topology(errors))
            }
        }
    }

    /// Re-propagate the current level of every driver in id order
    pub fn settle(&mut self) -> Result<usize, SessionError> {
        self.require_graph()?;
        let drivers: Vec<(ComponentId, bool)> = self
            .netlist
            .components()
            .filter(|c| c.is_driver())
            .map(|c| (c.id(), c.state().level().is_high()))
            .collect();
        let mut steps = 0;
        for (driver, high) in drivers {
            steps += self.engine.pass_state(&mut self.netlist, driver, high as u64)?.steps;
        }
        Ok(steps)
    }

    /// Flip a switch or clock and propagate; returns the new level
    pub fn toggle(&mut self, id: ComponentId) -> Result<Level, SessionError> {
        let component = self.require(id)?;
        if !component.is_driver() {
            return Err(SessionError::WrongKind(id, "driver"));
        }
        let next = !component.state().level().is_high();
        self.drive(id, next)
    }

    /// Advance a clock by one half period
    pub fn tick(&mut self, id: ComponentId) -> Result<Level, SessionError> {
        let component = self.require(id)?;
        if *component.kind() != ComponentKind::Clock {
            return Err(SessionError::WrongKind(id, "clock"));
        }
        let next = !component.state().level().is_high();
        self.drive(id, next)
    }

    /// Set a driver to an explicit level
    pub fn set_driver(&mut self, id: ComponentId, high: bool) -> Result<Level, SessionError> {
        if !self.require(id)?.is_driver() {
            return Err(SessionError::WrongKind(id, "driver"));
        }
        self.drive(id, high)
    }

    /// Raw engine entry point; any non-zero value drives high
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a placed driver.
    pub fn pass_state(&mut self, id: ComponentId, value: u64) -> Result<PropagationReport, SessionError> {
        self.require_graph()?;
        Ok(self.engine.pass_state(&mut self.netlist, id, value)?)
    }

    fn drive(&mut self, id: ComponentId, high: bool) -> Result<Level, SessionError> {
        self.require_graph()?;
        let report = self.engine.pass_state(&mut self.netlist, id, high as u64)?;
        debug!("drove {} {} in {} steps", id, if high { "high" } else { "low" }, report.steps);
        Ok(Level::from_bool(high))
    }

    pub fn component(&self, id: ComponentId) -> Result<&Component, SessionError> {
        self.require(id)
    }

    /// All components in id order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.netlist.components()
    }

    pub fn state(&self, id: ComponentId) -> Result<&State, SessionError> {
        Ok(self.require(id)?.state())
    }

    /// Text buffered by an ASCII display
    pub fn display_text(&self, id: ComponentId) -> Result<String, SessionError> {
        self.require(id)?
            .display_text()
            .ok_or(SessionError::WrongKind(id, "ASCII display"))
    }

    /// Live id standing for `id`, following wire splits
    pub fn current_id(&self, id: ComponentId) -> ComponentId {
        self.netlist.current_id(id)
    }

    fn require(&self, id: ComponentId) -> Result<&Component, SessionError> {
        self.netlist.get(id).ok_or(SessionError::UnknownComponent(id))
    }

    fn require_graph(&self) -> Result<(), SessionError> {
        if self.is_simulating() {
            Ok(())
        } else {
            Err(SessionError::SimulationUnavailable)
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Session {
        Session::new(SessionConfig::new().with_grid(16, 16))
    }

    #[test]
    fn test_driver_ops_require_built_graph() {
        let mut session = small();
        let switch = session.place(ComponentKind::Switch, 0, 0, Rotation::Deg0).unwrap();
        assert_eq!(session.toggle(switch), Err(SessionError::SimulationUnavailable));

        session.build_graph().unwrap();
        assert_eq!(session.toggle(switch), Ok(Level::High));

        session.place(ComponentKind::Led, 0, 2, Rotation::Deg0).unwrap();
        assert_eq!(*session.graph_status(), GraphStatus::Stale);
        assert_eq!(session.toggle(switch), Err(SessionError::SimulationUnavailable));
    }

    #[test]
    fn test_tick_rejects_switches() {
        let mut session = small();
        let switch = session.place(ComponentKind::Switch, 0, 0, Rotation::Deg0).unwrap();
        let clock = session.place(ComponentKind::Clock, 2, 0, Rotation::Deg0).unwrap();
        session.build_graph().unwrap();

        assert_eq!(session.tick(switch), Err(SessionError::WrongKind(switch, "clock")));
        assert_eq!(session.tick(clock), Ok(Level::High));
        assert_eq!(session.tick(clock), Ok(Level::Low));
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let mut session = small();
        let ghost = ComponentId::new(99);
        assert_eq!(session.delete(ghost).unwrap_err(), SessionError::UnknownComponent(ghost));
        assert!(session.state(ghost).is_err());
        assert!(session.move_to(ghost, 1, 1).is_err());
    }

    #[test]
    fn test_rejected_move_keeps_links() {
        let mut session = small();
        let switch = session.place(ComponentKind::Switch, 0, 0, Rotation::Deg0).unwrap();
        let led = session.place(ComponentKind::Led, 0, 2, Rotation::Deg0).unwrap();
        session.place(ComponentKind::Led, 5, 5, Rotation::Deg0).unwrap();

        let blocked = session.move_to(led, 5, 5);
        assert!(matches!(blocked, Err(SessionError::Placement(_))));
        let led_component = session.component(led).unwrap();
        assert_eq!(led_component.anchor(), Cell::new(0, 2));
        assert!(led_component.inputs().contains(switch));
    }

    #[test]
    fn test_move_relinks_at_new_position() {
        let mut session = small();
        let switch = session.place(ComponentKind::Switch, 0, 0, Rotation::Deg0).unwrap();
        let led = session.place(ComponentKind::Led, 3, 3, Rotation::Deg0).unwrap();
        assert!(session.component(led).unwrap().inputs().is_empty());

        assert_eq!(session.move_to(led, 0, 2), Ok(led));
        assert!(session.component(led).unwrap().inputs().contains(switch));
        assert!(session.component(switch).unwrap().outputs().contains(led));
    }

    #[test]
    fn test_display_text_on_wrong_kind() {
        let mut session = small();
        let led = session.place(ComponentKind::Led, 0, 2, Rotation::Deg0).unwrap();
        assert_eq!(
            session.display_text(led),
            Err(SessionError::WrongKind(led, "ASCII display"))
        );
    }
}
