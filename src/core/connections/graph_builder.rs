use crate::core::errors::TopologyError;
use crate::core::netlist::Netlist;
use crate::core::types::ComponentId;
use log::{debug, warn};
use std::collections::{HashMap, HashSet, VecDeque};

/// Derives directional input/output edges from discovered connections
///
/// Each driver is walked breadth first; wires learn their single input and
/// their outputs, gates hand their outputs downstream. Illegal topologies
/// abort the walk of the driver that found them.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Walk from one driver, returning the number of components visited
    ///
    /// # Panics
    ///
    /// Panics if `driver` is not a placed driver component.
    pub fn build_from(netlist: &mut Netlist, driver: ComponentId) -> Result<usize, TopologyError> {
        let Some(start) = netlist.get(driver) else {
            panic!("graph build requested from unknown component {}", driver);
        };
        assert!(
            start.is_driver(),
            "graph build requested from {} which is a {}, not a driver",
            driver,
            start.kind()
        );

        let mut visited: HashSet<ComponentId> = HashSet::from([driver]);
        let mut queue: VecDeque<ComponentId> = VecDeque::new();
        // wire -> the driver or gate feeding its net
        let mut sources: HashMap<ComponentId, ComponentId> = HashMap::new();

        let first_hop: Vec<ComponentId> = start.outputs().get().collect();
        for peer in first_hop {
            Self::check_not_gate_output(netlist, driver, driver, peer)?;
            Self::claim_net(netlist, &mut sources, driver, driver, peer)?;
            if let Some(component) = netlist.get_mut(peer) {
                component.inputs.add(driver, None);
            }
            if visited.insert(peer) {
                queue.push_back(peer);
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(component) = netlist.get(current) else {
                continue;
            };

            if component.is_driver() {
                let (first, second) = if driver < current {
                    (driver, current)
                } else {
                    (current, driver)
                };
                return Err(TopologyError::DriverConflict { first, second });
            }

            let source = if component.is_wire() {
                sources.get(&current).copied().unwrap_or(current)
            } else {
                current
            };
            let downstream: Vec<ComponentId> = if component.is_wire() {
                let input = component.inputs().first();
                let reachable: HashSet<ComponentId> = input
                    .and_then(|i| netlist.get(i))
                    .map(|upstream| upstream.outputs().get().collect())
                    .unwrap_or_default();
                component
                    .connections()
                    .get()
                    .filter(|peer| Some(*peer) != input && !reachable.contains(peer))
                    .collect()
            } else if component.is_gate() {
                let outputs: Vec<ComponentId> = component.outputs().get().collect();
                if outputs.iter().any(|o| component.inputs().contains(*o)) {
                    return Err(TopologyError::DriverIntoGateOutput { driver, gate: current });
                }
                outputs
            } else {
                Vec::new()
            };

            for peer in downstream {
                Self::check_not_gate_output(netlist, driver, current, peer)?;
                Self::claim_net(netlist, &mut sources, driver, source, peer)?;
                if let Some(component) = netlist.get_mut(current) {
                    if component.is_wire() {
                        component.outputs.add(peer, None);
                    }
                }
                if let Some(next) = netlist.get_mut(peer) {
                    next.inputs.add(current, None);
                }
                if visited.insert(peer) {
                    queue.push_back(peer);
                }
            }
        }

        Ok(visited.len())
    }

    /// Reject an edge from `upstream` into a gate that already drives it
    fn check_not_gate_output(
        netlist: &Netlist,
        driver: ComponentId,
        upstream: ComponentId,
        peer: ComponentId,
    ) -> Result<(), TopologyError> {
        match netlist.get(peer) {
            Some(gate) if gate.is_gate() && gate.outputs().contains(upstream) => {
                Err(TopologyError::DriverIntoGateOutput { driver, gate: peer })
            }
            _ => Ok(()),
        }
    }

    /// Record `source` as the feed of the wire net `peer` belongs to
    ///
    /// A net already fed by a different source means the driver's path has
    /// been shorted onto a gate output.
    fn claim_net(
        netlist: &Netlist,
        sources: &mut HashMap<ComponentId, ComponentId>,
        driver: ComponentId,
        source: ComponentId,
        peer: ComponentId,
    ) -> Result<(), TopologyError> {
        if !netlist.get(peer).is_some_and(|c| c.is_wire()) {
            return Ok(());
        }
        let held = *sources.entry(peer).or_insert(source);
        if held == source {
            return Ok(());
        }
        let gate = if netlist.get(held).is_some_and(|c| c.is_gate()) {
            held
        } else {
            source
        };
        Err(TopologyError::DriverIntoGateOutput { driver, gate })
    }

    /// Walk from every driver in id order, collecting distinct errors
    pub fn build(netlist: &mut Netlist) -> Result<(), Vec<TopologyError>> {
        let drivers: Vec<ComponentId> = netlist
            .components()
            .filter(|c| c.is_driver())
            .map(|c| c.id())
            .collect();

        let mut errors: Vec<TopologyError> = Vec::new();
        for driver in drivers {
            match Self::build_from(netlist, driver) {
                Ok(visited) => debug!("graph from driver {} reached {} components", driver, visited),
                Err(error) => {
                    warn!("graph build from driver {} failed: {}", driver, error);
                    if !errors.contains(&error) {
                        errors.push(error);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
