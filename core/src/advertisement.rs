use std::sync::Arc;

use crate::node_id::NodeId;

/// A message routed over the trust graph.
///
/// `sender` is always the immediate previous hop, never the originator —
/// the protocol carries no notion of "reply" or origin identity beyond
/// what the payload itself encodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advertisement {
    sender: NodeId,
    inbound_ttl: u32,
    payload: Arc<[u8]>,
}

impl Advertisement {
    pub fn new(sender: NodeId, inbound_ttl: u32, payload: impl Into<Arc<[u8]>>) -> Self {
        Self {
            sender,
            inbound_ttl,
            payload: payload.into(),
        }
    }

    pub fn sender(&self) -> NodeId {
        self.sender
    }

    pub fn inbound_ttl(&self) -> u32 {
        self.inbound_ttl
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// A fresh advertisement with a new sender and TTL but the same
    /// payload bytes (the `Arc<[u8]>` backing makes this a cheap clone,
    /// never a re-allocation).
    pub fn with_hop(&self, sender: NodeId, inbound_ttl: u32) -> Self {
        Self {
            sender,
            inbound_ttl,
            payload: Arc::clone(&self.payload),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn with_hop_preserves_payload_shares_allocation() {
        let a = Advertisement::new(NodeId::random(), 10, b"hello".to_vec());
        let next = NodeId::random();
        let b = a.with_hop(next, 9);
        assert_eq!(b.sender(), next);
        assert_eq!(b.inbound_ttl(), 9);
        assert_eq!(b.payload(), a.payload());
        assert!(Arc::ptr_eq(&a.payload, &b.payload));
    }
}
