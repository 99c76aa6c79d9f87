use crate::storage::{Reassembler, Writer};
use crate::wire::SeqNumber;

use super::{Ack, Segment};

/// The receiving endpoint of a TCP connection.
///
/// Translates inbound segments into reassembler insertions and reports the
/// cumulative acknowledgment and flow-control window back to the peer. The
/// only state held here is the peer's initial sequence number; stream
/// progress lives in the reassembler and the stream itself.
#[derive(Debug, Default)]
pub struct Receiver {
    isn: Option<SeqNumber>,
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one inbound segment into the reassembler.
    ///
    /// Segments arriving before the peer's SYN carry no usable stream
    /// position and are dropped.
    pub fn receive(&mut self, segment: &Segment, reassembler: &mut Reassembler, writer: &mut Writer<'_>) {
        if segment.syn && self.isn.is_none() {
            self.isn = Some(segment.seqno);
        }
        let isn = match self.isn {
            Some(isn) => isn,
            None => return,
        };

        // The write cursor is the best checkpoint: the peer sends near it.
        let abs_seqno = segment.seqno.unwrap(isn, writer.bytes_pushed());
        let stream_index = if segment.syn {
            // Payload of the SYN segment starts right after the SYN slot.
            0
        } else if abs_seqno == 0 {
            // A non-SYN segment claiming the SYN's slot carries no data
            // position at all.
            return;
        } else {
            abs_seqno - 1
        };

        reassembler.insert(stream_index, &segment.payload, segment.fin, writer);
    }

    /// The acknowledgment and window to advertise to the peer.
    pub fn send(&self, writer: &Writer<'_>) -> Ack {
        let window_size = writer.available_capacity().min(usize::from(u16::MAX)) as u16;

        let ackno = self.isn.map(|isn| {
            // One slot for the SYN, plus every byte written so far, plus one
            // for the FIN once the reassembler has closed the stream.
            let mut next = 1 + writer.bytes_pushed();
            if writer.is_closed() {
                next += 1;
            }
            SeqNumber::wrap(next, isn)
        });

        Ack { ackno, window_size }
    }
}
