//! Just enough on-the-wire representation for the core to frame and parse
//! its own queues.
//!
//! Each protocol module follows the same scheme: a byte-slice wrapper type
//! (lowercase, e.g. [`ethernet::frame`]) giving checked field access over raw
//! octets, and a high-level `Repr` that can be parsed from and emitted into
//! such a wrapper. Owned currency types ([`ethernet::Frame`],
//! [`ipv4::Packet`]) wrap a buffer for the queues that hand packets between
//! components.

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest = ::core::ops::RangeFrom<usize>;
}

mod error;

pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod tcp;

pub use self::error::{Error, Result};

pub use self::ethernet::{
    Address as EthernetAddress,
    EtherType as EthernetProtocol,
    Frame as EthernetFrame,
    Repr as EthernetRepr,
};

pub use self::arp::{Operation as ArpOperation, Repr as ArpRepr};

pub use self::ipv4::{
    Address as Ipv4Address,
    Cidr as Ipv4Cidr,
    Packet as Ipv4Packet,
    Repr as Ipv4Repr,
};

pub use self::tcp::SeqNumber;
