//! Network-neutral core of the Kaleidoscope limited-advertisement
//! protocol (NYU TR2008-918 §4.1): a Random Routing Table pairing each
//! neighbor with one successor in a Hamiltonian cycle, and the
//! advertisement engine that plans and forwards walks over it.
//!
//! Transport, persistence medium, identifier format, payload format, and
//! neighbor-selection policy are all external collaborators; this crate
//! only defines the contracts it needs from them ([`PersistenceAdapter`],
//! [`AdvertisementSink`]).

mod advertisement;
mod engine;
mod error;
mod node_id;
mod persistence;
mod routing_table;
mod snapshot;

pub use advertisement::Advertisement;
pub use engine::{AdvertisementSink, Engine, InvalidParams, Params};
pub use error::{InvalidSnapshot, PersistenceError};
pub use node_id::{NodeId, ParseNodeIdError};
pub use persistence::{PersistenceAdapter, TextFilePersistenceAdapter};
pub use routing_table::RoutingTable;
pub use snapshot::{is_valid_snapshot, validate_snapshot, Snapshot};
