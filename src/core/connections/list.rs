use crate::core::types::ComponentId;
use std::collections::HashMap;

/// One entry of a connection list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub peer: ComponentId,
    /// Port index on the owning component; `None` when the link was derived
    /// by the graph builder rather than by geometry
    pub index: Option<usize>,
}

/// Per-component record of the peers it is connected to
///
/// Holds peer ids rather than references; callers resolve ids against the
/// session's component table. Mirroring onto the peer's own list is the
/// caller's job (see `Netlist::link`, `Netlist::unlink` and
/// `Netlist::unlink_all`).
#[derive(Debug, Clone, Default)]
pub struct ConnectionList {
    /// Links in insertion order
    links: Vec<Link>,
    /// peer -> position in `links`
    positions: HashMap<ComponentId, usize>,
}

impl ConnectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a peer; no-op returning `false` if it is already present
    pub fn add(&mut self, peer: ComponentId, index: Option<usize>) -> bool {
        if self.positions.contains_key(&peer) {
            return false;
        }
        self.positions.insert(peer, self.links.len());
        self.links.push(Link { peer, index });
        true
    }

    /// Drop a peer, returning `true` if it was present
    pub fn remove(&mut self, peer: ComponentId) -> bool {
        let Some(position) = self.positions.remove(&peer) else {
            return false;
        };
        self.links.remove(position);
        for link in &self.links[position..] {
            if let Some(p) = self.positions.get_mut(&link.peer) {
                *p -= 1;
            }
        }
        true
    }

    /// Peers in insertion order
    pub fn get(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.links.iter().map(|link| link.peer)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn first(&self) -> Option<ComponentId> {
        self.links.first().map(|link| link.peer)
    }

    /// Peers recorded at a positional port index
    pub fn get_by_connection_index(&self, index: usize) -> Vec<ComponentId> {
        self.links
            .iter()
            .filter(|link| link.index == Some(index))
            .map(|link| link.peer)
            .collect()
    }

    /// Port index a peer was recorded at
    pub fn index_of(&self, peer: ComponentId) -> Option<usize> {
        self.positions
            .get(&peer)
            .and_then(|&position| self.links[position].index)
    }

    pub fn contains(&self, peer: ComponentId) -> bool {
        self.positions.contains_key(&peer)
    }

    /// Remove every link, returning the peers that were dropped
    pub fn clear(&mut self) -> Vec<ComponentId> {
        self.positions.clear();
        self.links.drain(..).map(|link| link.peer).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
