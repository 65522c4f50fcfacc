use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::node_id::NodeId;
use crate::snapshot::{validate_snapshot, Snapshot};

/// The only place I/O occurs in the core (§4.3). Adapters store and load
/// whole [`Snapshot`] values; the serialized form is adapter-defined.
pub trait PersistenceAdapter {
    fn store(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;
    fn load(&self) -> Result<Snapshot, PersistenceError>;
}

/// On-disk document shape: two fields, each NodeId rendered via its
/// stable `Display` string (§6's reference text-serialization format).
#[derive(Serialize, Deserialize)]
struct SnapshotDocument {
    routes_map: HashMap<String, String>,
    ordered_neighbors_list: Vec<String>,
}

impl From<&Snapshot> for SnapshotDocument {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            routes_map: snapshot
                .routes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ordered_neighbors_list: snapshot
                .ordered_neighbors
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

impl TryFrom<SnapshotDocument> for Snapshot {
    type Error = PersistenceError;

    fn try_from(doc: SnapshotDocument) -> Result<Self, Self::Error> {
        let mut routes = HashMap::with_capacity(doc.routes_map.len());
        for (k, v) in &doc.routes_map {
            routes.insert(NodeId::from_str(k)?, NodeId::from_str(v)?);
        }
        let ordered_neighbors = doc
            .ordered_neighbors_list
            .iter()
            .map(|s| NodeId::from_str(s))
            .collect::<Result<Vec<_>, _>>()?;
        let snapshot = Snapshot::new(routes, ordered_neighbors);
        validate_snapshot(&snapshot)?;
        Ok(snapshot)
    }
}

/// Reference persistence adapter (§4.3, §6): serializes a [`Snapshot`] to
/// pretty-printed JSON text at a fixed path, the way `sdk::pubkey`'s
/// `write_pubkey_file`/`read_pubkey_file` round-trip a single Pubkey in
/// this lineage.
pub struct TextFilePersistenceAdapter {
    path: PathBuf,
}

impl TextFilePersistenceAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceAdapter for TextFilePersistenceAdapter {
    fn store(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let document = SnapshotDocument::from(snapshot);
        let text = serde_json::to_string_pretty(&document)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, text)?;
        log::debug!(
            "stored snapshot with {} routes to {}",
            snapshot.routes.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Snapshot, PersistenceError> {
        let text = std::fs::read_to_string(&self.path)?;
        let document: SnapshotDocument = serde_json::from_str(&text)?;
        let snapshot = Snapshot::try_from(document)?;
        log::debug!(
            "loaded snapshot with {} routes from {}",
            snapshot.routes.len(),
            self.path.display()
        );
        Ok(snapshot)
    }
}
