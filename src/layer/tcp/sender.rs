use std::collections::VecDeque;

use crate::storage::Reader;
use crate::time::{Duration, Expiration, Instant};
use crate::wire::SeqNumber;

use super::{Ack, Segment};

/// The sending endpoint of a TCP connection.
///
/// Pulls bytes off the outbound stream, wraps them into segments honoring
/// the peer's flow-control window, and keeps every unacknowledged segment
/// queued for retransmission. A single timer covers the earliest outstanding
/// segment; every expiry retransmits it and, while the peer's window is
/// open, doubles the timeout.
///
/// The sender never transmits by itself. Segments accumulate in a ready
/// queue that the embedder drains through [`maybe_send`], and time only
/// advances through [`tick`].
///
/// [`maybe_send`]: #method.maybe_send
/// [`tick`]: #method.tick
#[derive(Debug)]
pub struct Sender {
    isn: SeqNumber,
    initial_rto: Duration,
    max_payload: usize,

    /// Sequence-space slots consumed so far: SYN + payload bytes + FIN.
    next_seqno: u64,
    /// Highest cumulative acknowledgment from the peer.
    ackd_seqno: u64,
    bytes_in_flight: u64,
    /// The peer's advertised window, raw. Until the first acknowledgment
    /// arrives the handshake allowance of one slot applies.
    peer_window: u16,
    syn_sent: bool,
    fin_sent: bool,

    rto: Duration,
    expires_at: Expiration,
    now: Instant,
    consecutive_retx: u64,

    /// Sent but not fully acknowledged, in transmit order.
    outstanding: VecDeque<Segment>,
    /// Built but not yet handed to the embedder.
    ready: VecDeque<Segment>,
}

impl Sender {
    /// Largest payload placed into a single segment.
    pub const MAX_PAYLOAD: usize = 1452;

    /// Create a sender.
    ///
    /// A fixed initial sequence number can be pinned, which tests rely on;
    /// otherwise one is drawn at random.
    pub fn new(initial_rto: Duration, isn: Option<SeqNumber>) -> Self {
        Sender {
            isn: isn.unwrap_or_else(|| SeqNumber(rand::random())),
            initial_rto,
            max_payload: Self::MAX_PAYLOAD,
            next_seqno: 0,
            ackd_seqno: 0,
            bytes_in_flight: 0,
            peer_window: 1,
            syn_sent: false,
            fin_sent: false,
            rto: initial_rto,
            expires_at: Expiration::Never,
            now: Instant::from_millis(0),
            consecutive_retx: 0,
            outstanding: VecDeque::new(),
            ready: VecDeque::new(),
        }
    }

    /// Cap the payload of future segments below [`MAX_PAYLOAD`].
    ///
    /// [`MAX_PAYLOAD`]: #associatedconstant.MAX_PAYLOAD
    pub fn set_max_payload(&mut self, max_payload: usize) {
        assert!(max_payload > 0);
        self.max_payload = max_payload;
    }

    /// The sequence number the next new segment will carry.
    pub fn next_seqno(&self) -> SeqNumber {
        self.isn + self.next_seqno
    }

    /// Sequence-space slots sent but not yet acknowledged.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    /// Timeouts suffered in a row since the last acknowledged progress.
    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retx
    }

    /// The window new segments must fit, with the one-slot allowance that
    /// keeps probing a peer that advertises zero.
    fn window(&self) -> u64 {
        u64::from(self.peer_window).max(1)
    }

    /// Emit every segment the stream and the window currently allow.
    pub fn push(&mut self, reader: &mut Reader<'_>) {
        let window = self.window();

        if !self.syn_sent {
            // The stream may already be finished, in which case SYN and FIN
            // share a segment when the window covers both slots.
            let fin = reader.is_finished() && window >= 2;
            self.syn_sent = true;
            self.fin_sent = fin;
            self.transmit(Segment {
                seqno: self.isn,
                syn: true,
                payload: Vec::new(),
                fin,
            });
            return;
        }

        while self.bytes_in_flight < window && reader.bytes_buffered() > 0 {
            let headroom = (window - self.bytes_in_flight) as usize;
            let take = reader.bytes_buffered().min(headroom).min(self.max_payload);
            let payload = reader.read(take);
            // FIN rides along only when a slot remains after the payload.
            let fin = !self.fin_sent && reader.is_finished() && headroom > payload.len();
            self.fin_sent |= fin;
            self.transmit(Segment {
                seqno: self.isn + self.next_seqno,
                syn: false,
                payload,
                fin,
            });
        }

        if !self.fin_sent && reader.is_finished() && self.bytes_in_flight < window {
            self.fin_sent = true;
            self.transmit(Segment {
                seqno: self.isn + self.next_seqno,
                syn: false,
                payload: Vec::new(),
                fin: true,
            });
        }
    }

    fn transmit(&mut self, segment: Segment) {
        let len = segment.sequence_length() as u64;
        self.bytes_in_flight += len;
        self.next_seqno += len;
        self.outstanding.push_back(segment.clone());
        self.ready.push_back(segment);
        if self.expires_at == Expiration::Never {
            self.expires_at = Expiration::When(self.now + self.rto);
        }
    }

    /// Process an acknowledgment from the peer's receiver.
    pub fn receive(&mut self, ack: &Ack) {
        self.peer_window = ack.window_size;

        let ackno = match ack.ackno {
            Some(ackno) => ackno,
            None => return,
        };
        let ackno = ackno.unwrap(self.isn, self.next_seqno);
        if ackno <= self.ackd_seqno || ackno > self.next_seqno {
            // Stale, or acknowledging slots never sent.
            return;
        }
        self.ackd_seqno = ackno;

        while let Some(front) = self.outstanding.front() {
            let begin = front.seqno.unwrap(self.isn, self.ackd_seqno);
            if begin + front.sequence_length() as u64 > ackno {
                // Partially covered segments are retained in full.
                break;
            }
            self.bytes_in_flight -= front.sequence_length() as u64;
            self.outstanding.pop_front();
        }

        self.rto = self.initial_rto;
        self.consecutive_retx = 0;
        self.expires_at = if self.outstanding.is_empty() {
            Expiration::Never
        } else {
            Expiration::When(self.now + self.rto)
        };
    }

    /// Report elapsed time; retransmits when the timer has run out.
    pub fn tick(&mut self, elapsed: Duration) {
        self.now += elapsed;

        let expired = match self.expires_at {
            Expiration::When(deadline) => self.now >= deadline,
            Expiration::Never => false,
        };
        if !expired || self.outstanding.is_empty() {
            return;
        }

        if let Some(earliest) = self.outstanding.front().cloned() {
            net_trace!("retransmit seqno {} ({} slots)", earliest.seqno, earliest.sequence_length());
            self.ready.push_back(earliest);
        }

        if self.peer_window > 0 {
            self.consecutive_retx += 1;
            self.rto = self.rto * 2;
        }
        // Zero-window probes keep firing at the base timeout without
        // escalating the backoff.
        self.expires_at = Expiration::When(self.now + self.rto);
    }

    /// Hand out the next segment bound for the wire.
    pub fn maybe_send(&mut self) -> Option<Segment> {
        self.ready.pop_front()
    }

    /// An empty segment at the current position, for carrying a bare
    /// acknowledgment without consuming sequence space.
    pub fn empty_segment(&self) -> Segment {
        Segment {
            seqno: self.isn + self.next_seqno,
            syn: false,
            payload: Vec::new(),
            fin: false,
        }
    }
}
