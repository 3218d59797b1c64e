use serde::{Deserialize, Serialize};

/// Identifier of a placed component
///
/// Ids are handed out by the session in increasing order and are never
/// reused while the session is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    /// Create a component id from its raw value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the four slots of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Slot index used by the placeholder grid
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Side {
        Side::ALL[index % 4]
    }

    pub fn opposite(self) -> Side {
        Side::from_index(self.index() + 2)
    }

    /// Rotate clockwise by the given number of quarter turns
    pub fn rotated(self, quarter_turns: usize) -> Side {
        Side::from_index(self.index() + quarter_turns)
    }
}

/// Placement rotation, clockwise around the component's top-left anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn quarter_turns(self) -> usize {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Build a rotation from degrees; anything other than the four right
    /// angles is rejected
    pub fn from_degrees(degrees: u32) -> Option<Rotation> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// True when rows and columns of the footprint are swapped
    pub fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Size of a component body in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub rows: usize,
    pub cols: usize,
}

impl Footprint {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Footprint after applying a rotation
    pub fn rotated(self, rotation: Rotation) -> Footprint {
        if rotation.is_transposed() {
            Footprint::new(self.cols, self.rows)
        } else {
            self
        }
    }
}

/// Tri-valued logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Level {
    #[default]
    Unknown,
    Low,
    High,
}

impl Level {
    /// Any truthy value collapses to `High`
    pub fn from_bool(value: bool) -> Level {
        if value {
            Level::High
        } else {
            Level::Low
        }
    }

    /// Unknown reads as low
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    pub fn inverted(self) -> Level {
        Level::from_bool(!self.is_high())
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        Level::from_bool(value)
    }
}

/// Current state of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Level(Level),
    /// Multi-bit output, most significant bit first
    Bits(Vec<bool>),
}

impl State {
    /// Level of the given output bit; single-level states ignore the index
    pub fn bit(&self, index: usize) -> Level {
        match self {
            State::Level(level) => *level,
            State::Bits(bits) => bits.get(index).copied().map(Level::from_bool).unwrap_or(Level::Unknown),
        }
    }

    pub fn level(&self) -> Level {
        self.bit(0)
    }
}

impl Default for State {
    fn default() -> Self {
        State::Level(Level::Unknown)
    }
}

impl From<Level> for State {
    fn from(level: Level) -> Self {
        State::Level(level)
    }
}

/// Grid position of a component's top-left anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i64,
    pub col: i64,
}

impl Cell {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
