use crate::core::components::kind::ComponentKind;
use crate::core::components::port_specs::roles;
use crate::core::connections::list::ConnectionList;
use crate::core::geometry::{self, ComponentSpace};
use crate::core::types::{Cell, ComponentId, Footprint, Level, Rotation, State};
use std::collections::{BTreeMap, VecDeque};

/// Characters kept by an ASCII display before the oldest are dropped
pub const DISPLAY_CAPACITY: usize = 256;

/// Internal memory carried across propagation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Memory {
    Stateless,
    /// Flip-flops remember the clock level seen on their last evaluation
    Clocked { last_clock: Level },
    /// Programmed words of a PROM, indexed by address
    Programmed { words: Vec<u64> },
    Display { last_clock: Level, text: VecDeque<char> },
}

impl Memory {
    fn for_kind(kind: &ComponentKind, programmed: Vec<u64>) -> Memory {
        match kind {
            ComponentKind::Dff | ComponentKind::Jkff => Memory::Clocked {
                last_clock: Level::Unknown,
            },
            ComponentKind::Prom { .. } => Memory::Programmed { words: programmed },
            ComponentKind::AsciiDisplay => Memory::Display {
                last_clock: Level::Unknown,
                text: VecDeque::new(),
            },
            _ => Memory::Stateless,
        }
    }
}

/// A placed circuit element
#[derive(Debug, Clone)]
pub struct Component {
    pub(crate) id: ComponentId,
    pub(crate) kind: ComponentKind,
    pub(crate) anchor: Cell,
    pub(crate) rotation: Rotation,
    pub(crate) state: State,
    /// Upstream peers; for non-wires filled by discovery, for wires by the
    /// graph builder
    pub(crate) inputs: ConnectionList,
    /// Downstream peers
    pub(crate) outputs: ConnectionList,
    /// Undirected peers of a wire, known before direction is decided
    pub(crate) connections: ConnectionList,
    /// Semantic ports: role name -> peer
    pub(crate) named: BTreeMap<String, ComponentId>,
    pub(crate) memory: Memory,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        kind: ComponentKind,
        anchor: Cell,
        rotation: Rotation,
        programmed: Vec<u64>,
    ) -> Self {
        let memory = Memory::for_kind(&kind, programmed);
        Self {
            id,
            state: kind.initial_state(),
            kind,
            anchor,
            rotation,
            inputs: ConnectionList::new(),
            outputs: ConnectionList::new(),
            connections: ConnectionList::new(),
            named: BTreeMap::new(),
            memory,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Top-left cell of the rotated body
    pub fn anchor(&self) -> Cell {
        self.anchor
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Footprint at the placed rotation
    pub fn footprint(&self) -> Footprint {
        self.kind.canonical_footprint().rotated(self.rotation)
    }

    pub fn canonical_footprint(&self) -> Footprint {
        self.kind.canonical_footprint()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn inputs(&self) -> &ConnectionList {
        &self.inputs
    }

    pub fn outputs(&self) -> &ConnectionList {
        &self.outputs
    }

    pub fn connections(&self) -> &ConnectionList {
        &self.connections
    }

    pub fn named_connections(&self) -> &BTreeMap<String, ComponentId> {
        &self.named
    }

    pub fn named(&self, role: &str) -> Option<ComponentId> {
        self.named.get(role).copied()
    }

    pub fn is_driver(&self) -> bool {
        self.kind.is_driver()
    }

    pub fn is_gate(&self) -> bool {
        self.kind.is_gate()
    }

    pub fn is_wire(&self) -> bool {
        self.kind.is_wire()
    }

    pub fn num_inputs(&self) -> usize {
        self.kind.num_inputs()
    }

    pub fn num_outputs(&self) -> usize {
        self.kind.num_outputs()
    }

    /// Every body cell and port slot this component claims
    pub fn space(&self) -> ComponentSpace {
        geometry::resolve(&self.kind, self.anchor, self.rotation)
    }

    /// Programmed words of a PROM
    pub fn programmed_data(&self) -> Option<&[u64]> {
        match &self.memory {
            Memory::Programmed { words } => Some(words),
            _ => None,
        }
    }

    /// Buffered text of an ASCII display
    pub fn display_text(&self) -> Option<String> {
        match &self.memory {
            Memory::Display { text, .. } => Some(text.iter().collect()),
            _ => None,
        }
    }

    /// Output role this component reads from a multi-output `producer`,
    /// looked up through its own named connections
    pub(crate) fn output_role_toward(&self, producer: ComponentId) -> Option<&str> {
        self.named
            .iter()
            .find(|(role, peer)| **peer == producer && (role.as_str() == roles::Q || role.as_str() == roles::Q_BAR))
            .map(|(role, _)| role.as_str())
    }
}
