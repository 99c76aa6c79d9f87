use std::collections::VecDeque;

use crate::layer::eth::Interface;
use crate::wire::{ipv4, Ipv4Address, Ipv4Cidr};

use super::route::{Route, Routes};

/// An IPv4 router: a set of interfaces joined by a routing table.
///
/// Frames are fed in per interface with [`receive_frame`]; datagrams
/// accepted there are staged until [`route`] forwards them, decrementing the
/// TTL and refreshing the header checksum on the way. Datagrams whose TTL
/// runs out or whose destination matches no route are dropped without
/// ceremony (no ICMP lives at this layer).
///
/// [`receive_frame`]: #method.receive_frame
/// [`route`]: #method.route
#[derive(Debug, Default)]
pub struct Router {
    interfaces: Vec<Interface>,
    /// Datagrams delivered by each interface, waiting for a routing pass.
    staged: Vec<VecDeque<ipv4::Packet>>,
    routes: Routes,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an interface; its index is stable from here on.
    pub fn add_interface(&mut self, interface: Interface) -> usize {
        self.interfaces.push(interface);
        self.staged.push(VecDeque::new());
        self.interfaces.len() - 1
    }

    /// Direct traffic for `net` out of interface `interface`, optionally via
    /// a gateway.
    pub fn add_route(&mut self, net: Ipv4Cidr, next_hop: Option<Ipv4Address>, interface: usize) {
        assert!(interface < self.interfaces.len());
        self.routes.add_route(Route { net, next_hop, interface });
    }

    /// Access an interface, e.g. to drain its outbound frames.
    pub fn interface_mut(&mut self, index: usize) -> &mut Interface {
        &mut self.interfaces[index]
    }

    /// Feed one frame from the wire into the interface at `index`.
    ///
    /// A datagram accepted by the interface is staged for the next routing
    /// pass.
    pub fn receive_frame(&mut self, index: usize, frame: &[u8]) {
        if let Some(datagram) = self.interfaces[index].recv_frame(frame) {
            self.staged[index].push_back(datagram);
        }
    }

    /// Forward every staged datagram.
    pub fn route(&mut self) {
        for index in 0..self.staged.len() {
            while let Some(datagram) = self.staged[index].pop_front() {
                self.forward(datagram);
            }
        }
    }

    fn forward(&mut self, mut datagram: ipv4::Packet) {
        // A datagram at the end of its life is dropped, not bounced.
        if datagram.hop_limit() <= 1 {
            return;
        }
        let hop_limit = datagram.hop_limit() - 1;
        datagram.set_hop_limit(hop_limit);
        datagram.fill_checksum();

        let dst_addr = datagram.dst_addr();
        let route = match self.routes.lookup(dst_addr) {
            Some(route) => route,
            None => return,
        };

        let next_hop = route.next_hop.unwrap_or(dst_addr);
        self.interfaces[route.interface].send_datagram(datagram, next_hop);
    }
}
