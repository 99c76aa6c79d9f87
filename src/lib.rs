//! The protocol core of a user-space TCP/IP stack.
//!
//! This library contains the state machines that make a byte stream reliable
//! and route it across a link: a bounded [byte pipe](storage::ByteStream), a
//! [reassembler](storage::Reassembler) for out-of-order data, a TCP
//! [sender](layer::tcp::Sender) and [receiver](layer::tcp::Receiver), a
//! [network interface](layer::eth::Interface) resolving IPv4 next hops over
//! ARP, and an IPv4 [router](layer::ip::Router) forwarding by longest-prefix
//! match.
//!
//! ## Design
//!
//! Everything here is driven from the outside. No operation blocks, no
//! background task runs, and time only advances when the embedder calls a
//! `tick` method with the duration that passed. Each component is a plain
//! struct whose methods run to completion; outputs accumulate in queues the
//! embedder drains (`maybe_send` and friends). This keeps the core
//! deterministic and directly testable: a test can replay any interleaving of
//! packets and clock advancement and observe exactly what a deployment would.
//!
//! Putting frames on an actual wire is out of scope. The [`wire`] module
//! carries just enough header codec for the core to frame and parse its own
//! queues; tun/tap plumbing and socket drivers live with the embedder.

#[macro_use]
mod macros;
pub mod layer;
pub mod storage;
pub mod time;
pub mod wire;
