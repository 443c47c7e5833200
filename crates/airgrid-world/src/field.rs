//! Fields: one resource unit per spatial cell per tick.
//!
//! A [`Field`] exists once something touches the cell it addresses and is
//! never explicitly destroyed -- stale fields persist as history.
//! `allocated_to` is an exclusive grant written only by the allocator;
//! `occupied_by` records physical presence, which is a separate concern
//! (an agent may hold a cell it has not yet reached).

use airgrid_types::{AgentId, TimeCoordinate};
use serde::{Deserialize, Serialize};

/// A pending bid attached to a field.
///
/// The auction mechanism itself lives outside this crate; the grid only
/// stores the bid and exposes its public portion to other participants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// The agent that placed the bid.
    pub agent: AgentId,
    /// Offered amount.
    pub amount: f64,
}

/// The publicly visible portion of a [`Bid`]. Other participants can see
/// the price but not who offered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidInfo {
    /// Offered amount.
    pub amount: f64,
}

impl Bid {
    /// The portion of the bid visible to other participants.
    pub const fn public_info(&self) -> BidInfo {
        BidInfo {
            amount: self.amount,
        }
    }
}

/// One resource unit at a single spatiotemporal grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The cell this field occupies.
    pub coordinate: TimeCoordinate,
    /// The agent holding the exclusive allocation grant, if any.
    /// At most one agent may hold this at any time.
    pub allocated_to: Option<AgentId>,
    /// The agent physically present in the cell, if any.
    pub occupied_by: Option<AgentId>,
    /// A pending bid on this field, if any.
    pub bid: Option<Bid>,
}

impl Field {
    /// Create an empty (unallocated, unoccupied) field at a cell.
    pub const fn new(coordinate: TimeCoordinate) -> Self {
        Self {
            coordinate,
            allocated_to: None,
            occupied_by: None,
            bid: None,
        }
    }

    /// Whether some agent holds the allocation grant for this cell.
    pub const fn is_allocated(&self) -> bool {
        self.allocated_to.is_some()
    }

    /// Whether some agent is physically present in this cell.
    pub const fn is_occupied(&self) -> bool {
        self.occupied_by.is_some()
    }

    /// Whether the given agent may use this cell: it must be neither
    /// occupied nor allocated by anyone else.
    pub fn is_free_for(&self, agent: AgentId) -> bool {
        (self.occupied_by.is_none() || self.occupied_by == Some(agent))
            && (self.allocated_to.is_none() || self.allocated_to == Some(agent))
    }
}
