//! The link layer: turning IP datagrams into Ethernet frames.
//!
//! The [`Interface`] owns one hardware/protocol address pair and does the
//! work RFC 826 expects of a host: resolve next-hop IPv4 addresses to
//! Ethernet addresses, park datagrams while resolution is in flight, answer
//! requests for its own address, and age out what it has learned.

mod interface;
mod neighbor;

pub use interface::Interface;

pub use neighbor::{
    Answer as NeighborAnswer,
    Cache as NeighborCache,
    Neighbor,
};
