use std::collections::HashMap;
use std::sync::Mutex;

use dashmap::DashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::advertisement::Advertisement;
use crate::error::InvalidSnapshot;
use crate::node_id::NodeId;
use crate::snapshot::{validate_snapshot, Snapshot};

/// Random Routing Table: a per-node structure pairing each neighbor with
/// exactly one successor neighbor in a single Hamiltonian cycle over all
/// neighbors (§4.1).
///
/// `routes` is a lock-free-read concurrent map; `ordered_neighbors` is the
/// single mutex the whole module serializes mutators and ordered-sequence
/// reads through (§5).
pub struct RoutingTable {
    routes: DashMap<NodeId, NodeId>,
    ordered_neighbors: Mutex<Vec<NodeId>>,
    rng: Mutex<ChaCha20Rng>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
            ordered_neighbors: Mutex::new(Vec::new()),
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Builds a table matching `snapshot`, failing if it violates I1-I4.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, InvalidSnapshot> {
        validate_snapshot(snapshot)?;
        let routes = DashMap::new();
        for (k, v) in &snapshot.routes {
            routes.insert(*k, *v);
        }
        Ok(Self {
            routes,
            ordered_neighbors: Mutex::new(snapshot.ordered_neighbors.clone()),
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.routes.contains_key(&id)
    }

    pub fn size(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns `routes[prior_id]` if present, else `None`. Never panics.
    pub fn get_next_hop(&self, prior_id: NodeId) -> Option<NodeId> {
        self.routes.get(&prior_id).map(|entry| *entry.value())
    }

    /// Equivalent to `get_next_hop(advertisement.sender())`.
    pub fn next_hop_for(&self, advertisement: &Advertisement) -> Option<NodeId> {
        self.get_next_hop(advertisement.sender())
    }

    /// An independent copy of the current ordered-neighbors sequence.
    pub fn ordered_neighbors(&self) -> Vec<NodeId> {
        self.ordered_neighbors.lock().unwrap().clone()
    }

    /// Idempotent if `id` is already present. Disrupts at most one
    /// existing route.
    pub fn add_neighbor(&self, id: NodeId) {
        let mut ordered = self.ordered_neighbors.lock().unwrap();
        self.add_single_locked(id, &mut ordered);
    }

    /// Idempotent on overlap. Disrupts at most one existing route
    /// regardless of batch size.
    pub fn add_neighbors<I: IntoIterator<Item = NodeId>>(&self, ids: I) {
        let mut ordered = self.ordered_neighbors.lock().unwrap();
        let batch: Vec<NodeId> = ids
            .into_iter()
            .filter(|id| !self.routes.contains_key(id))
            .collect();
        self.add_batch_locked(batch, &mut ordered);
    }

    /// No-op if `id` is absent.
    pub fn remove_neighbor(&self, id: NodeId) {
        let mut ordered = self.ordered_neighbors.lock().unwrap();
        self.remove_single_locked(id, &mut ordered);
    }

    /// Equivalent in final state to sequential singles in iteration order;
    /// each single removal is internally atomic, but the batch as a whole
    /// is not — other threads may observe intermediate states between
    /// removals.
    pub fn remove_neighbors<I: IntoIterator<Item = NodeId>>(&self, ids: I) {
        for id in ids {
            self.remove_neighbor(id);
        }
    }

    pub fn clear(&self) {
        let mut ordered = self.ordered_neighbors.lock().unwrap();
        self.routes.clear();
        ordered.clear();
    }

    /// An atomic point-in-time dump; never reflects an interleaved
    /// mutation.
    pub fn snapshot(&self) -> Snapshot {
        let ordered = self.ordered_neighbors.lock().unwrap();
        let routes: HashMap<NodeId, NodeId> = self
            .routes
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        Snapshot::new(routes, ordered.clone())
    }

    // --- internal, lock-already-held algorithms -------------------------

    fn add_single_locked(&self, v: NodeId, ordered: &mut Vec<NodeId>) {
        if self.routes.contains_key(&v) {
            return;
        }
        if self.routes.is_empty() {
            self.routes.insert(v, v);
            ordered.push(v);
            return;
        }
        let (x, y) = self.random_edge();
        // Install v -> y before overwriting x -> y, so a concurrent reader
        // never observes y as unreachable (§4.1 rationale).
        self.routes.insert(v, y);
        self.routes.insert(x, v);
        self.insert_ordered_at_random(v, ordered);
    }

    fn add_batch_locked(&self, batch: Vec<NodeId>, ordered: &mut Vec<NodeId>) {
        match batch.len() {
            0 => {}
            1 => self.add_single_locked(batch[0], ordered),
            _ => {
                let shuffled = self.shuffled(batch);
                if self.routes.is_empty() {
                    for window in shuffled.windows(2) {
                        self.routes.insert(window[0], window[1]);
                    }
                    let last = *shuffled.last().unwrap();
                    let first = shuffled[0];
                    self.routes.insert(last, first);
                } else {
                    let (x, y) = self.random_edge();
                    for window in shuffled.windows(2) {
                        self.routes.insert(window[0], window[1]);
                    }
                    let last = *shuffled.last().unwrap();
                    let first = shuffled[0];
                    // Splice the whole chain into the x -> y edge: close
                    // the new chain onto y before severing x's old edge.
                    self.routes.insert(last, y);
                    self.routes.insert(x, first);
                }
                for id in shuffled {
                    self.insert_ordered_at_random(id, ordered);
                }
            }
        }
    }

    fn remove_single_locked(&self, v: NodeId, ordered: &mut Vec<NodeId>) {
        if !self.routes.contains_key(&v) {
            return;
        }
        if let Some(pos) = ordered.iter().position(|id| *id == v) {
            ordered.remove(pos);
        }
        if self.routes.len() == 1 {
            self.routes.remove(&v);
            return;
        }
        let predecessor = self
            .routes
            .iter()
            .find(|entry| *entry.value() == v)
            .map(|entry| *entry.key())
            .expect("a valid cycle always has exactly one predecessor");
        let successor = *self.routes.get(&v).unwrap();
        self.routes.insert(predecessor, successor);
        self.routes.remove(&v);
    }

    fn random_edge(&self) -> (NodeId, NodeId) {
        let edges: Vec<(NodeId, NodeId)> = self
            .routes
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        let idx = self.rng.lock().unwrap().gen_range(0..edges.len());
        edges[idx]
    }

    fn insert_ordered_at_random(&self, id: NodeId, ordered: &mut Vec<NodeId>) {
        let pos = self.rng.lock().unwrap().gen_range(0..=ordered.len());
        ordered.insert(pos, id);
    }

    fn shuffled(&self, mut items: Vec<NodeId>) -> Vec<NodeId> {
        use rand::seq::SliceRandom;
        items.shuffle(&mut *self.rng.lock().unwrap());
        items
    }
}
