//! The network layer: forwarding IPv4 datagrams between interfaces.
//!
//! A [`Router`] owns a set of [interfaces](crate::layer::eth::Interface) and
//! a [routing table](Routes); relevant rfc1519, rfc4632 for the
//! classless-prefix matching.

mod route;
mod router;
#[cfg(test)]
mod tests;

pub use route::{Route, Routes};
pub use router::Router;
