use crate::core::components::component::Component;
use crate::core::components::kind::ComponentKind;
use crate::core::components::logic::{self, InputLevels};
use crate::core::errors::PropagationError;
use crate::core::netlist::Netlist;
use crate::core::types::{ComponentId, Level, State};
use log::{debug, trace, warn};
use std::collections::VecDeque;

/// Breadth-first state propagation over the directional graph
///
/// Gates are re-evaluated every time they are reached; wires and sinks are
/// only revisited when the value they would copy differs from what they
/// hold. The step ceiling is the only guard against combinational loops.
#[derive(Debug, Clone, Copy)]
pub struct PropagationEngine {
    max_steps: usize,
}

/// Summary of one propagation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationReport {
    /// Dequeues performed before quiescence
    pub steps: usize,
}

impl PropagationEngine {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Set a driver to `value` (any non-zero value is high) and propagate
    /// until quiescent
    ///
    /// # Panics
    ///
    /// Panics if `driver` is not a placed driver component.
    pub fn pass_state(
        &self,
        netlist: &mut Netlist,
        driver: ComponentId,
        value: u64,
    ) -> Result<PropagationReport, PropagationError> {
        let level = Level::from_bool(value != 0);
        let Some(source) = netlist.get_mut(driver) else {
            panic!("propagation requested from unknown component {}", driver);
        };
        assert!(
            source.is_driver(),
            "propagation requested from {} which is a {}, not a driver",
            driver,
            source.kind()
        );
        source.state = State::Level(level);

        let mut queue: VecDeque<ComponentId> = source.outputs().get().collect();
        let mut steps = 0usize;

        while let Some(current) = queue.pop_front() {
            steps += 1;
            if steps >= self.max_steps {
                warn!(
                    "propagation from {} exceeded {} steps, aborting",
                    driver, self.max_steps
                );
                return Err(PropagationError::UnstableLoop {
                    driver,
                    limit: self.max_steps,
                });
            }

            let Some(next_state) = Self::next_state(netlist, current) else {
                continue;
            };
            trace!("step {}: {} -> {:?}", steps, current, next_state);
            if let Some(component) = netlist.get_mut(current) {
                component.state = next_state;
            }

            let Some(component) = netlist.get(current) else {
                continue;
            };
            for output in component.outputs().get() {
                let Some(downstream) = netlist.get(output) else {
                    continue;
                };
                if downstream.is_gate() {
                    queue.push_back(output);
                } else if downstream.state().level() != Self::level_seen_by(netlist, downstream, current) {
                    queue.push_back(output);
                }
            }
        }

        debug!("propagation from {} quiesced after {} steps", driver, steps);
        Ok(PropagationReport { steps })
    }

    /// New state for a dequeued component; `None` leaves it untouched
    fn next_state(netlist: &mut Netlist, id: ComponentId) -> Option<State> {
        let component = netlist.get(id)?;
        if component.is_driver() {
            return None;
        }
        if component.is_gate() {
            let levels = Self::gather_inputs(netlist, component);
            let component = netlist.get_mut(id)?;
            return Some(logic::evaluate(
                &component.kind,
                &mut component.memory,
                &component.state,
                &levels,
            ));
        }
        let upstream = netlist.get(component.inputs().first()?)?;
        Some(State::Level(Self::level_seen_by(netlist, component, upstream.id())))
    }

    fn gather_inputs(netlist: &Netlist, component: &Component) -> InputLevels {
        let mut levels = InputLevels::new(component.num_inputs());
        for link in component.inputs().links() {
            levels.push(link.index, Self::level_seen_by(netlist, component, link.peer));
        }
        levels
    }

    /// Level `consumer` reads from `producer`
    ///
    /// Flip-flop outputs are chosen through the consumer's named
    /// connections; other multi-output producers through the port index
    /// they recorded for the consumer.
    fn level_seen_by(netlist: &Netlist, consumer: &Component, producer: ComponentId) -> Level {
        let Some(source) = netlist.get(producer) else {
            return Level::Unknown;
        };
        let named = match source.kind() {
            ComponentKind::Dff | ComponentKind::Jkff => consumer
                .output_role_toward(producer)
                .and_then(logic::output_index_of_role),
            _ => None,
        };
        let index = named
            .or_else(|| source.outputs().index_of(consumer.id()))
            .unwrap_or(0);
        logic::output_level(source.kind(), source.state(), index)
    }
}
