use std::sync::Arc;

use thiserror::Error;

use crate::advertisement::Advertisement;
use crate::node_id::NodeId;
use crate::routing_table::RoutingTable;

/// The three tunables a node supplies to its advertisement engine (§6),
/// with the workspace's stated defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    pub ideal_reach: u32,
    pub min_route_length: u32,
    pub max_route_length: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("max_route_length ({max}) must exceed min_route_length ({min}) by at least 1")]
pub struct InvalidParams {
    pub min: u32,
    pub max: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            ideal_reach: 100,
            min_route_length: 7,
            max_route_length: 20,
        }
    }
}

impl Params {
    pub fn new(
        ideal_reach: u32,
        min_route_length: u32,
        max_route_length: u32,
    ) -> Result<Self, InvalidParams> {
        if max_route_length < min_route_length + 1 {
            return Err(InvalidParams {
                min: min_route_length,
                max: max_route_length,
            });
        }
        Ok(Self {
            ideal_reach,
            min_route_length,
            max_route_length,
        })
    }
}

/// Embedder-provided sink that both `advertise_self` and the forwarding
/// path call into. Must not block the caller for long.
pub trait AdvertisementSink {
    fn send_advertisement(&self, message: Advertisement, neighbor: NodeId, ttl: u32);
}

/// The decision logic that plans outbound walks and forwards inbound
/// advertisements. Carries no state of its own beyond a borrow of the
/// node's [`RoutingTable`] and its own identity and tunables.
pub struct Engine<'a> {
    self_id: NodeId,
    rrt: &'a RoutingTable,
    params: Params,
}

impl<'a> Engine<'a> {
    pub fn new(self_id: NodeId, rrt: &'a RoutingTable, params: Params) -> Self {
        Self {
            self_id,
            rrt,
            params,
        }
    }

    /// Forwards an inbound advertisement one hop, decrementing its TTL.
    /// Returns `false` ("not forwarded") if the TTL is out of range or the
    /// sender has no known next hop; both are normal drops, not errors.
    pub fn handle_advertisement(
        &self,
        message: &Advertisement,
        sink: &dyn AdvertisementSink,
    ) -> bool {
        let ttl = message.inbound_ttl();
        if ttl <= 1 || ttl > self.params.max_route_length {
            return false;
        }
        let Some(next) = self.rrt.next_hop_for(message) else {
            return false;
        };
        let forwarded_ttl = ttl - 1;
        let forwarded = message.with_hop(self.self_id, forwarded_ttl);
        sink.send_advertisement(forwarded, next, forwarded_ttl);
        true
    }

    /// Plans and emits the node's own self-advertisement walks (§4.2).
    pub fn advertise_self(&self, payload: impl Into<Arc<[u8]>>, sink: &dyn AdvertisementSink) {
        let payload: Arc<[u8]> = payload.into();
        let ordered = self.rrt.ordered_neighbors();
        let degree = ordered.len();
        if degree == 0 {
            return;
        }

        let r = self.params.ideal_reach;
        let w_min = self.params.min_route_length;
        let w_max = self.params.max_route_length;

        // Case A: degree too low to reach `r` even saturating the network.
        if (degree as u64) * (w_max as u64) < r as u64 {
            for neighbor in ordered {
                self.emit(&payload, neighbor, w_max, sink);
            }
            return;
        }

        // Case B (degree high, use a subset) vs Case C (degree in-between,
        // use every neighbor).
        let walk_count = if (degree as u64) * (w_min as u64) > r as u64 {
            (r / w_min) as usize
        } else {
            degree
        };
        if walk_count == 0 {
            return;
        }

        let std_len = r / walk_count as u32;
        let rem = r % walk_count as u32;
        for (i, neighbor) in ordered.into_iter().take(walk_count).enumerate() {
            let mut len = std_len + if (i as u32) < rem { 1 } else { 0 };
            // Open question (a): the apportionment formula only guarantees
            // len >= w_min when r >= walk_count * w_min; clip defensively.
            if len < w_min {
                len = w_min;
            }
            self.emit(&payload, neighbor, len, sink);
        }
    }

    fn emit(&self, payload: &Arc<[u8]>, neighbor: NodeId, len: u32, sink: &dyn AdvertisementSink) {
        let message = Advertisement::new(self.self_id, len, Arc::clone(payload));
        sink.send_advertisement(message, neighbor, len);
    }
}
