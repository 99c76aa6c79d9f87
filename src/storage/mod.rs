//! Owned byte storage feeding the transport layer.
//!
//! The [`ByteStream`] is a bounded pipe between one producer and one
//! consumer; the [`Reassembler`] turns indexed, possibly out-of-order
//! substrings back into such a pipe.

pub mod reassembler;
pub mod stream;

pub use self::reassembler::Reassembler;
pub use self::stream::{ByteStream, Reader, Writer};
