use crate::core::components::port_specs::{roles, PortSpec};
use crate::core::errors::PlacementError;
use crate::core::types::{Footprint, Level, Side, State};
use serde::{Deserialize, Serialize};

pub const MAX_GATE_INPUTS: usize = 8;
pub const MAX_SELECT_BITS: usize = 4;
pub const MAX_ADDRESS_BITS: usize = 16;
pub const MAX_DATA_BITS: usize = 64;
pub const DISPLAY_DATA_BITS: usize = 8;

/// Combinational gate operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOp {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Not,
}

/// Closed set of component variants
///
/// Capabilities (`is_driver`, `is_gate`, port counts, footprint) are
/// answered by matching on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Straight conductor spanning `length` cells
    Wire { length: usize },
    Switch,
    Clock,
    Led,
    Gate { op: GateOp, inputs: usize },
    Dff,
    Jkff,
    Mux { select_bits: usize },
    /// Address decoder backed by programmed words
    Prom { address_bits: usize, data_bits: usize },
    AsciiDisplay,
}

/// Port stub in canonical (zero rotation) coordinates relative to the
/// body's top-left cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPort {
    pub row: i64,
    pub col: i64,
    pub side: Side,
    pub spec: PortSpec,
}

impl LocalPort {
    fn new(row: i64, col: i64, side: Side, spec: PortSpec) -> Self {
        Self { row, col, side, spec }
    }
}

/// Body rows needed for `n` inputs on the back edge; an even count gets an
/// extra row so the centre line carries no input
pub fn body_rows(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

/// Rows of the `n` inputs along the back edge, skipping the centre row when
/// `n` is even
pub fn input_rows(n: usize) -> Vec<i64> {
    (0..n)
        .map(|i| {
            if n % 2 == 0 && i >= n / 2 {
                i as i64 + 1
            } else {
                i as i64
            }
        })
        .collect()
}

impl ComponentKind {
    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Wire { .. } => "WIRE",
            ComponentKind::Switch => "SWITCH",
            ComponentKind::Clock => "CLOCK",
            ComponentKind::Led => "LED",
            ComponentKind::Gate { op, .. } => match op {
                GateOp::And => "AND",
                GateOp::Or => "OR",
                GateOp::Nand => "NAND",
                GateOp::Nor => "NOR",
                GateOp::Xor => "XOR",
                GateOp::Not => "NOT",
            },
            ComponentKind::Dff => "DFF",
            ComponentKind::Jkff => "JKFF",
            ComponentKind::Mux { .. } => "MUX",
            ComponentKind::Prom { .. } => "PROM",
            ComponentKind::AsciiDisplay => "ASCII",
        }
    }

    pub fn gate(op: GateOp, inputs: usize) -> Self {
        ComponentKind::Gate { op, inputs }
    }

    pub fn is_wire(&self) -> bool {
        matches!(self, ComponentKind::Wire { .. })
    }

    /// Drivers originate signals instead of computing them
    pub fn is_driver(&self) -> bool {
        matches!(self, ComponentKind::Switch | ComponentKind::Clock)
    }

    /// Gates recompute their state from their inputs through a rule
    pub fn is_gate(&self) -> bool {
        matches!(
            self,
            ComponentKind::Gate { .. }
                | ComponentKind::Dff
                | ComponentKind::Jkff
                | ComponentKind::Mux { .. }
                | ComponentKind::Prom { .. }
                | ComponentKind::AsciiDisplay
        )
    }

    /// Sequential components sample their clock on every evaluation
    pub fn is_clocked(&self) -> bool {
        matches!(self, ComponentKind::Dff | ComponentKind::Jkff | ComponentKind::AsciiDisplay)
    }

    /// Reject parameter combinations that have no layout
    pub fn validate(&self) -> Result<(), PlacementError> {
        let bad = |msg: String| Err(PlacementError::InvalidShape(msg));
        match *self {
            ComponentKind::Wire { length } if length < 2 => {
                bad(format!("wire length must be at least 2 cells, got {}", length))
            }
            ComponentKind::Gate { op: GateOp::Not, inputs } if inputs != 1 => {
                bad(format!("NOT gate takes exactly 1 input, got {}", inputs))
            }
            ComponentKind::Gate { op, inputs }
                if op != GateOp::Not && !(2..=MAX_GATE_INPUTS).contains(&inputs) =>
            {
                bad(format!(
                    "{} gate takes 2..={} inputs, got {}",
                    self.name(),
                    MAX_GATE_INPUTS,
                    inputs
                ))
            }
            ComponentKind::Mux { select_bits } if !(1..=MAX_SELECT_BITS).contains(&select_bits) => {
                bad(format!("MUX takes 1..={} select bits, got {}", MAX_SELECT_BITS, select_bits))
            }
            ComponentKind::Prom { address_bits, data_bits }
                if !(1..=MAX_ADDRESS_BITS).contains(&address_bits)
                    || !(1..=MAX_DATA_BITS).contains(&data_bits) =>
            {
                bad(format!(
                    "PROM needs 1..={} address bits and 1..={} data bits, got {}/{}",
                    MAX_ADDRESS_BITS, MAX_DATA_BITS, address_bits, data_bits
                ))
            }
            _ => Ok(()),
        }
    }

    /// Body footprint at zero rotation
    pub fn canonical_footprint(&self) -> Footprint {
        match *self {
            ComponentKind::Wire { length } => Footprint::new(1, length),
            ComponentKind::Switch | ComponentKind::Clock | ComponentKind::Led => Footprint::new(1, 1),
            ComponentKind::Gate { op: GateOp::Not, .. } => Footprint::new(1, 1),
            ComponentKind::Gate { inputs, .. } => Footprint::new(body_rows(inputs), 2),
            ComponentKind::Dff | ComponentKind::Jkff => Footprint::new(3, 2),
            ComponentKind::Mux { select_bits } => {
                Footprint::new(body_rows(1 << select_bits), select_bits.max(2))
            }
            ComponentKind::Prom { address_bits, data_bits } => {
                Footprint::new(body_rows(address_bits).max(data_bits), 3)
            }
            ComponentKind::AsciiDisplay => Footprint::new(DISPLAY_DATA_BITS, 6),
        }
    }

    /// Total input ports, named ones included
    pub fn num_inputs(&self) -> usize {
        match *self {
            ComponentKind::Wire { .. } | ComponentKind::Switch | ComponentKind::Clock => 0,
            ComponentKind::Led => 1,
            ComponentKind::Gate { inputs, .. } => inputs,
            ComponentKind::Dff => 2,
            ComponentKind::Jkff => 3,
            ComponentKind::Mux { select_bits } => (1 << select_bits) + select_bits,
            ComponentKind::Prom { address_bits, .. } => address_bits + 1,
            ComponentKind::AsciiDisplay => DISPLAY_DATA_BITS + 1,
        }
    }

    /// Total output ports; zero for sinks
    pub fn num_outputs(&self) -> usize {
        match *self {
            ComponentKind::Wire { .. } | ComponentKind::Led | ComponentKind::AsciiDisplay => 0,
            ComponentKind::Dff | ComponentKind::Jkff => 2,
            ComponentKind::Prom { data_bits, .. } => data_bits,
            _ => 1,
        }
    }

    /// State a freshly placed component starts in
    pub fn initial_state(&self) -> State {
        match *self {
            ComponentKind::Switch | ComponentKind::Clock => State::Level(Level::Low),
            ComponentKind::Prom { data_bits, .. } => State::Bits(vec![false; data_bits]),
            _ => State::Level(Level::Unknown),
        }
    }

    /// Port stubs at zero rotation: inputs sit just outside the back (left)
    /// edge facing right, outputs just outside the front (right) edge facing
    /// left, named control inputs just below the body facing up. Wires carry
    /// a stub on every cell instead.
    pub fn canonical_ports(&self) -> Vec<LocalPort> {
        let fp = self.canonical_footprint();
        let (rows, cols) = (fp.rows as i64, fp.cols as i64);
        let mut ports = Vec::new();

        let back = |ports: &mut Vec<LocalPort>, rows: Vec<i64>| {
            for (i, row) in rows.into_iter().enumerate() {
                ports.push(LocalPort::new(row, -1, Side::Right, PortSpec::input(i)));
            }
        };

        match *self {
            ComponentKind::Wire { length } => {
                let last = length - 1;
                for i in 0..length {
                    let spec = PortSpec::wire(i);
                    if i > 0 {
                        ports.push(LocalPort::new(0, i as i64, Side::Left, spec.clone()));
                    }
                    if i < last {
                        ports.push(LocalPort::new(0, i as i64, Side::Right, spec));
                    }
                }
            }
            ComponentKind::Switch | ComponentKind::Clock => {
                ports.push(LocalPort::new(0, cols, Side::Left, PortSpec::output(0)));
            }
            ComponentKind::Led => back(&mut ports, vec![0]),
            ComponentKind::Gate { inputs, .. } => {
                back(&mut ports, input_rows(inputs));
                ports.push(LocalPort::new(rows / 2, cols, Side::Left, PortSpec::output(0)));
            }
            ComponentKind::Dff => {
                ports.push(LocalPort::new(1, -1, Side::Right, PortSpec::input(0)));
                ports.push(LocalPort::new(rows, cols / 2, Side::Top, PortSpec::input(1).named(roles::CLOCK)));
                ports.push(LocalPort::new(0, cols, Side::Left, PortSpec::output(0).named(roles::Q)));
                ports.push(LocalPort::new(2, cols, Side::Left, PortSpec::output(1).named(roles::Q_BAR)));
            }
            ComponentKind::Jkff => {
                ports.push(LocalPort::new(0, -1, Side::Right, PortSpec::input(0)));
                ports.push(LocalPort::new(2, -1, Side::Right, PortSpec::input(1)));
                ports.push(LocalPort::new(rows, cols / 2, Side::Top, PortSpec::input(2).named(roles::CLOCK)));
                ports.push(LocalPort::new(0, cols, Side::Left, PortSpec::output(0).named(roles::Q)));
                ports.push(LocalPort::new(2, cols, Side::Left, PortSpec::output(1).named(roles::Q_BAR)));
            }
            ComponentKind::Mux { select_bits } => {
                let data = 1usize << select_bits;
                back(&mut ports, input_rows(data));
                for k in 0..select_bits {
                    ports.push(LocalPort::new(
                        rows,
                        k as i64,
                        Side::Top,
                        PortSpec::input(data + k).named(&roles::select(k)),
                    ));
                }
                ports.push(LocalPort::new(rows / 2, cols, Side::Left, PortSpec::output(0)));
            }
            ComponentKind::Prom { address_bits, data_bits } => {
                back(&mut ports, input_rows(address_bits));
                ports.push(LocalPort::new(
                    rows,
                    cols / 2,
                    Side::Top,
                    PortSpec::input(address_bits).named(roles::CHIP_SELECT),
                ));
                for j in 0..data_bits {
                    ports.push(LocalPort::new(j as i64, cols, Side::Left, PortSpec::output(j)));
                }
            }
            ComponentKind::AsciiDisplay => {
                back(&mut ports, (0..DISPLAY_DATA_BITS as i64).collect());
                ports.push(LocalPort::new(
                    rows,
                    cols / 2,
                    Side::Top,
                    PortSpec::input(DISPLAY_DATA_BITS).named(roles::CLOCK),
                ));
            }
        }
        ports
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_inputs_skip_centre_row() {
        assert_eq!(input_rows(2), vec![0, 2]);
        assert_eq!(input_rows(3), vec![0, 1, 2]);
        assert_eq!(input_rows(4), vec![0, 1, 3, 4]);
        assert_eq!(body_rows(4), 5);
    }

    #[test]
    fn test_port_counts_match_layout() {
        let kinds = [
            ComponentKind::Switch,
            ComponentKind::Led,
            ComponentKind::gate(GateOp::And, 4),
            ComponentKind::gate(GateOp::Not, 1),
            ComponentKind::Dff,
            ComponentKind::Jkff,
            ComponentKind::Mux { select_bits: 2 },
            ComponentKind::Prom { address_bits: 6, data_bits: 8 },
            ComponentKind::AsciiDisplay,
        ];
        for kind in kinds {
            let ports = kind.canonical_ports();
            let inputs = ports.iter().filter(|p| p.spec.is_input()).count();
            let outputs = ports.iter().filter(|p| p.spec.is_output()).count();
            assert_eq!(inputs, kind.num_inputs(), "{}", kind);
            assert_eq!(outputs, kind.num_outputs(), "{}", kind);
        }
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert!(ComponentKind::gate(GateOp::Not, 2).validate().is_err());
        assert!(ComponentKind::gate(GateOp::Xor, 1).validate().is_err());
        assert!(ComponentKind::Wire { length: 1 }.validate().is_err());
        assert!(ComponentKind::Mux { select_bits: 0 }.validate().is_err());
        assert!(ComponentKind::gate(GateOp::Or, 3).validate().is_ok());
    }

    #[test]
    fn test_capabilities() {
        assert!(ComponentKind::Clock.is_driver());
        assert!(!ComponentKind::Led.is_gate());
        assert!(ComponentKind::Prom { address_bits: 2, data_bits: 2 }.is_gate());
        assert!(ComponentKind::Wire { length: 3 }.is_wire());
        assert!(ComponentKind::Dff.is_clocked());
    }
}
