use crate::wire::{Ipv4Address, Ipv4Cidr};

/// A prefix of addresses that should be routed via an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// The network routed through this route.
    ///
    /// Better only set actual networks here. Host identifiers (where not all
    /// bits outside the subnet mask are zero) are accepted but may lead to
    /// unexpected routing decisions.
    pub net: Ipv4Cidr,

    /// Next hop for this network, or `None` when it is directly attached and
    /// a datagram's own destination is the hop to resolve.
    pub next_hop: Option<Ipv4Address>,

    /// Index of the interface traffic for this network leaves through.
    pub interface: usize,
}

/// A routing table.
#[derive(Debug, Default)]
pub struct Routes {
    storage: Vec<Route>,
}

impl Routes {
    /// Create an empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn add_route(&mut self, route: Route) {
        net_debug!("route {} via {:?} on interface {}", route.net, route.next_hop, route.interface);
        self.storage.push(route);
    }

    /// Find the route whose prefix matches `addr` with the greatest length.
    ///
    /// Among matches of equal prefix length the entry added last wins.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<Route> {
        // The rules say to find the subnet with longest prefix.
        let mut best_match = None;
        for route in self.storage.iter() {
            if !route.net.contains_addr(&addr) {
                continue;
            }

            let best = best_match.get_or_insert(route);
            if best.net.prefix_len() <= route.net.prefix_len() {
                *best = route;
            }
        }
        best_match.copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn route(net: Ipv4Cidr, interface: usize) -> Route {
        Route { net, next_hop: None, interface }
    }

    #[test]
    fn test_longest_prefix() {
        let mut routes = Routes::new();
        routes.add_route(route(Ipv4Cidr::new(Ipv4Address::UNSPECIFIED, 0), 0));
        routes.add_route(route(Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), 1));
        routes.add_route(route(Ipv4Cidr::new(Ipv4Address::new(10, 1, 0, 0), 16), 2));

        assert_eq!(routes.lookup(Ipv4Address::new(8, 8, 8, 8)).unwrap().interface, 0);
        assert_eq!(routes.lookup(Ipv4Address::new(10, 2, 3, 4)).unwrap().interface, 1);
        assert_eq!(routes.lookup(Ipv4Address::new(10, 1, 3, 4)).unwrap().interface, 2);
    }

    #[test]
    fn test_no_match() {
        let mut routes = Routes::new();
        routes.add_route(route(Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), 0));
        assert_eq!(routes.lookup(Ipv4Address::new(11, 0, 0, 1)), None);
    }

    #[test]
    fn test_equal_length_prefers_later() {
        let mut routes = Routes::new();
        routes.add_route(route(Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), 0));
        routes.add_route(route(Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), 1));
        assert_eq!(routes.lookup(Ipv4Address::new(10, 9, 9, 9)).unwrap().interface, 1);
    }
}
