//! State-update rules for every component kind

use crate::core::components::component::{Memory, DISPLAY_CAPACITY};
use crate::core::components::kind::{ComponentKind, GateOp, DISPLAY_DATA_BITS};
use crate::core::components::port_specs::roles;
use crate::core::types::{Level, State};

/// Input levels gathered for one evaluation
#[derive(Debug, Clone, Default)]
pub struct InputLevels {
    /// Level per positional port index; unconnected ports read `Unknown`
    pub by_index: Vec<Level>,
    /// Level of every connected upstream peer in list order
    pub all: Vec<Level>,
}

impl InputLevels {
    pub fn new(num_inputs: usize) -> Self {
        Self {
            by_index: vec![Level::Unknown; num_inputs],
            all: Vec::new(),
        }
    }

    /// Record a peer's level at an optional port index
    pub fn push(&mut self, index: Option<usize>, level: Level) {
        if let Some(slot) = index.and_then(|i| self.by_index.get_mut(i)) {
            // several peers on one port: any high wins
            if *slot != Level::High {
                *slot = level;
            }
        }
        self.all.push(level);
    }

    pub fn at(&self, index: usize) -> Level {
        self.by_index.get(index).copied().unwrap_or(Level::Unknown)
    }

    /// Unsigned value of `count` ports starting at `start`, first port most
    /// significant
    pub fn value_msb_first(&self, start: usize, count: usize) -> u64 {
        (start..start + count).fold(0, |acc, i| (acc << 1) | self.at(i).is_high() as u64)
    }
}

/// Complement that keeps an unknown level unknown
fn complement(level: Level) -> Level {
    match level {
        Level::Unknown => Level::Unknown,
        known => known.inverted(),
    }
}

/// Combinational fold over every connected input
pub fn gate_level(op: GateOp, inputs: &[Level]) -> Level {
    let highs = inputs.iter().filter(|l| l.is_high()).count();
    let value = match op {
        GateOp::And => highs == inputs.len(),
        GateOp::Or => highs > 0,
        GateOp::Nand => highs != inputs.len(),
        GateOp::Nor => highs == 0,
        GateOp::Xor => highs % 2 == 1,
        GateOp::Not => highs == 0,
    };
    Level::from_bool(value)
}

fn rising(last_clock: &mut Level, clock: Level) -> bool {
    let edge = !last_clock.is_high() && clock.is_high();
    *last_clock = clock;
    edge
}

/// Recompute the state of a gate-like component
///
/// Sequential kinds update their remembered clock level as a side effect,
/// so each call observes at most one rising edge.
pub fn evaluate(kind: &ComponentKind, memory: &mut Memory, current: &State, inputs: &InputLevels) -> State {
    match (kind, memory) {
        (ComponentKind::Gate { op, .. }, _) => {
            if inputs.all.is_empty() {
                return current.clone();
            }
            State::Level(gate_level(*op, &inputs.all))
        }
        (ComponentKind::Dff, Memory::Clocked { last_clock }) => {
            if rising(last_clock, inputs.at(1)) {
                State::Level(Level::from_bool(inputs.at(0).is_high()))
            } else {
                current.clone()
            }
        }
        (ComponentKind::Jkff, Memory::Clocked { last_clock }) => {
            if !rising(last_clock, inputs.at(2)) {
                return current.clone();
            }
            let q = current.level();
            let next = match (inputs.at(0).is_high(), inputs.at(1).is_high()) {
                (false, false) => q,
                (false, true) => Level::Low,
                (true, false) => Level::High,
                (true, true) => q.inverted(),
            };
            State::Level(next)
        }
        (ComponentKind::Mux { select_bits }, _) => {
            let data = 1usize << *select_bits;
            let selected = (0..*select_bits)
                .filter(|k| inputs.at(data + k).is_high())
                .fold(0usize, |acc, k| acc | (1 << k));
            State::Level(inputs.at(selected))
        }
        (ComponentKind::Prom { address_bits, data_bits }, Memory::Programmed { words }) => {
            if !inputs.at(*address_bits).is_high() {
                return State::Bits(vec![false; *data_bits]);
            }
            let address = inputs.value_msb_first(0, *address_bits) as usize;
            let word = words.get(address).copied().unwrap_or(0);
            State::Bits(
                (0..*data_bits)
                    .map(|j| (word >> (data_bits - 1 - j)) & 1 == 1)
                    .collect(),
            )
        }
        (ComponentKind::AsciiDisplay, Memory::Display { last_clock, text }) => {
            if rising(last_clock, inputs.at(DISPLAY_DATA_BITS)) {
                let code = inputs.value_msb_first(0, DISPLAY_DATA_BITS) as u8;
                accept_display_code(text, code);
            }
            current.clone()
        }
        _ => current.clone(),
    }
}

/// Apply one character code to a display buffer
pub fn accept_display_code(text: &mut std::collections::VecDeque<char>, code: u8) {
    match code {
        12 => text.clear(),
        13 => text.push_back('\n'),
        32..=126 => text.push_back(code as char),
        _ => return,
    }
    while text.len() > DISPLAY_CAPACITY {
        text.pop_front();
    }
}

/// Level presented on output port `index` of a component in `state`
pub fn output_level(kind: &ComponentKind, state: &State, index: usize) -> Level {
    match kind {
        ComponentKind::Dff | ComponentKind::Jkff if index == 1 => complement(state.level()),
        _ => state.bit(index),
    }
}

/// Output index of a named output role
pub fn output_index_of_role(role: &str) -> Option<usize> {
    match role {
        roles::Q => Some(0),
        roles::Q_BAR => Some(1),
        _ => None,
    }
}
