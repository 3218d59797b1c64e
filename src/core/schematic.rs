//! Persistence records
//!
//! A schematic is an ordered list of placement records. Loading replays
//! them through the session, so the same placement rules apply.

use crate::core::components::component::Component;
use crate::core::components::kind::ComponentKind;
use crate::core::types::Rotation;
use serde::{Deserialize, Serialize};

/// One placed component as stored in a schematic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicRecord {
    /// Id the component had when saved; only used to map old ids to new
    pub id: u64,
    pub kind: ComponentKind,
    pub row: i64,
    pub col: i64,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programmed_data: Option<Vec<u64>>,
}

impl SchematicRecord {
    pub fn new(id: u64, kind: ComponentKind, row: i64, col: i64, rotation: Rotation) -> Self {
        Self {
            id,
            kind,
            row,
            col,
            rotation,
            programmed_data: None,
        }
    }

    /// Attach PROM contents, indexed by address
    pub fn with_programmed_data(mut self, words: Vec<u64>) -> Self {
        self.programmed_data = Some(words);
        self
    }
}

impl From<&Component> for SchematicRecord {
    fn from(component: &Component) -> Self {
        let anchor = component.anchor();
        Self {
            id: component.id().raw(),
            kind: component.kind().clone(),
            row: anchor.row,
            col: anchor.col,
            rotation: component.rotation(),
            programmed_data: component.programmed_data().map(<[u64]>::to_vec),
        }
    }
}
