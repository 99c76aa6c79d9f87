//! The two endpoint state machines of a TCP connection.
//!
//! The [`Sender`] turns an outbound byte stream into sequenced segments and
//! retransmits whatever the peer has not acknowledged; the [`Receiver`]
//! feeds inbound segments through a reassembler and reports the
//! acknowledgment and window that flow back. Neither touches headers or
//! checksums: segments here are already-parsed messages, and the embedder
//! owns the wire.
//!
//! Congestion control is deliberately absent. The sender obeys exactly the
//! flow-control window the peer advertises, plus the customary one-byte
//! allowance to probe a zero window.

mod receiver;
mod sender;

pub use receiver::Receiver;
pub use sender::Sender;

use crate::wire::SeqNumber;

/// A segment in the data direction, from sender to receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    /// Sequence number of the first sequence-space slot this segment covers.
    pub seqno: SeqNumber,
    /// Whether the segment opens the stream.
    pub syn: bool,
    /// The payload bytes.
    pub payload: Vec<u8>,
    /// Whether the segment ends the stream.
    pub fin: bool,
}

impl Segment {
    /// The number of sequence-space slots this segment occupies.
    ///
    /// SYN and FIN each take a slot of their own, before and after the
    /// payload respectively.
    pub fn sequence_length(&self) -> usize {
        self.payload.len() + usize::from(self.syn) + usize::from(self.fin)
    }
}

/// The acknowledgment direction, from receiver back to sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ack {
    /// The next sequence number the receiver expects. Absent until the
    /// receiver has seen a SYN.
    pub ackno: Option<SeqNumber>,
    /// How many more bytes the receiver is prepared to buffer.
    pub window_size: u16,
}
