// Heads up! Before working on this file you should read, at least,
// the parts of RFC 1122 that discuss ARP.
use std::collections::BTreeMap;

use crate::time::{Duration, Expiration, Instant};
use crate::wire::{EthernetAddress, Ipv4Address};

/// A cached neighbor.
///
/// A neighbor mapping translates from a protocol address to a hardware
/// address, and contains the timestamp past which the mapping should be
/// considered invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    hardware_addr: EthernetAddress,
    expires_at: Expiration,
}

/// An answer to a neighbor cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The neighbor address is in the cache and not expired.
    Found(EthernetAddress),
    /// The neighbor address is not in the cache, or has expired.
    NotFound,
    /// The neighbor address is not in the cache, or has expired,
    /// and a lookup has been made recently.
    RateLimited,
}

/// A neighbor cache with lookup throttling.
///
/// Besides resolved mappings the cache remembers which addresses have an
/// unanswered discovery request in flight, so that a burst of traffic to an
/// unresolved next hop asks the network once, not once per datagram.
#[derive(Debug, Default)]
pub struct Cache {
    entries: BTreeMap<Ipv4Address, Neighbor>,
    requests: BTreeMap<Ipv4Address, Instant>,
}

impl Cache {
    /// Neighbor entry lifetime.
    pub const ENTRY_LIFETIME: Duration = Duration::from_millis(30_000);

    /// Lifetime of an unanswered request. Until it passes, no new request
    /// for the same address goes out.
    pub const REQUEST_LIFETIME: Duration = Duration::from_millis(5_000);

    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the hardware address for a protocol address.
    pub fn lookup(&self, protocol_addr: Ipv4Address, timestamp: Instant) -> Answer {
        if let Some(neighbor) = self.entries.get(&protocol_addr) {
            if !neighbor.is_expired(timestamp) {
                return Answer::Found(neighbor.hardware_addr);
            }
        }

        match self.requests.get(&protocol_addr) {
            Some(&sent_at) if timestamp < sent_at + Self::REQUEST_LIFETIME => Answer::RateLimited,
            _ => Answer::NotFound,
        }
    }

    /// Add an entry containing a hardware address.
    ///
    /// Also settles any in-flight request for that address.
    pub fn fill(
        &mut self,
        protocol_addr: Ipv4Address,
        hardware_addr: EthernetAddress,
        timestamp: Instant,
    ) {
        debug_assert!(hardware_addr.is_unicast());
        self.entries.insert(protocol_addr, Neighbor {
            hardware_addr,
            expires_at: Expiration::When(timestamp + Self::ENTRY_LIFETIME),
        });
        self.requests.remove(&protocol_addr);
    }

    /// Record that a discovery request for this address went out.
    pub fn requesting(&mut self, protocol_addr: Ipv4Address, timestamp: Instant) {
        self.requests.insert(protocol_addr, timestamp);
    }

    /// Drop entries and request records that have aged out.
    pub fn evict_expired(&mut self, timestamp: Instant) {
        self.entries.retain(|_, neighbor| !neighbor.is_expired(timestamp));
        self.requests.retain(|_, &mut sent_at| timestamp < sent_at + Self::REQUEST_LIFETIME);
    }
}

impl Neighbor {
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.hardware_addr
    }

    pub fn is_expired(&self, timestamp: Instant) -> bool {
        Expiration::When(timestamp) >= self.expires_at
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HADDR_A: EthernetAddress = EthernetAddress([0, 0, 0, 0, 0, 1]);
    const HADDR_B: EthernetAddress = EthernetAddress([0, 0, 0, 0, 0, 2]);
    const IP_ADDR_1: Ipv4Address = Ipv4Address([10, 0, 0, 1]);
    const IP_ADDR_2: Ipv4Address = Ipv4Address([10, 0, 0, 2]);

    fn at(millis: i64) -> Instant {
        Instant::from_millis(millis)
    }

    #[test]
    fn fill_and_lookup() {
        let mut cache = Cache::new();
        assert_eq!(cache.lookup(IP_ADDR_1, at(0)), Answer::NotFound);

        cache.fill(IP_ADDR_1, HADDR_A, at(0));
        assert_eq!(cache.lookup(IP_ADDR_1, at(0)), Answer::Found(HADDR_A));
        assert_eq!(cache.lookup(IP_ADDR_2, at(0)), Answer::NotFound);
    }

    #[test]
    fn entries_expire() {
        let mut cache = Cache::new();
        cache.fill(IP_ADDR_1, HADDR_A, at(0));

        assert_eq!(cache.lookup(IP_ADDR_1, at(29_999)), Answer::Found(HADDR_A));
        assert_eq!(cache.lookup(IP_ADDR_1, at(30_000)), Answer::NotFound);
    }

    #[test]
    fn refresh_replaces() {
        let mut cache = Cache::new();
        cache.fill(IP_ADDR_1, HADDR_A, at(0));
        cache.fill(IP_ADDR_1, HADDR_B, at(10_000));
        assert_eq!(cache.lookup(IP_ADDR_1, at(35_000)), Answer::Found(HADDR_B));
    }

    #[test]
    fn requests_rate_limit() {
        let mut cache = Cache::new();
        cache.requesting(IP_ADDR_1, at(0));

        assert_eq!(cache.lookup(IP_ADDR_1, at(4_999)), Answer::RateLimited);
        assert_eq!(cache.lookup(IP_ADDR_1, at(5_000)), Answer::NotFound);
    }

    #[test]
    fn fill_settles_request() {
        let mut cache = Cache::new();
        cache.requesting(IP_ADDR_1, at(0));
        cache.fill(IP_ADDR_1, HADDR_A, at(100));
        assert_eq!(cache.lookup(IP_ADDR_1, at(200)), Answer::Found(HADDR_A));
    }

    #[test]
    fn eviction_clears_both_tables() {
        let mut cache = Cache::new();
        cache.fill(IP_ADDR_1, HADDR_A, at(0));
        cache.requesting(IP_ADDR_2, at(0));

        cache.evict_expired(at(4_999));
        assert_eq!(cache.lookup(IP_ADDR_1, at(4_999)), Answer::Found(HADDR_A));
        assert_eq!(cache.lookup(IP_ADDR_2, at(4_999)), Answer::RateLimited);

        cache.evict_expired(at(30_000));
        assert_eq!(cache.lookup(IP_ADDR_1, at(30_000)), Answer::NotFound);
        assert_eq!(cache.lookup(IP_ADDR_2, at(30_000)), Answer::NotFound);
    }
}
