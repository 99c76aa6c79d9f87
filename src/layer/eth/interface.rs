use std::collections::{BTreeMap, VecDeque};

use crate::time::{Duration, Instant};
use crate::wire::{arp, ethernet, ipv4};
use crate::wire::{EthernetAddress, Ipv4Address};

use super::neighbor::{Answer, Cache};

/// A network interface: the seam between IP datagrams and Ethernet frames.
///
/// Outbound datagrams are framed to the next hop's hardware address when it
/// is known; otherwise they wait, in submission order, while one ARP request
/// per next hop is out asking. Inbound frames are filtered by destination,
/// IPv4 payloads handed up, and ARP traffic absorbed: every supported ARP
/// message teaches us the sender's mapping, and requests for our own address
/// get a reply.
///
/// Frames leave through [`maybe_send`] in the order operations enqueued
/// them. Time advances only through [`tick`], which ages out what the
/// neighbor cache has learned.
///
/// [`maybe_send`]: #method.maybe_send
/// [`tick`]: #method.tick
#[derive(Debug)]
pub struct Interface {
    hardware_addr: EthernetAddress,
    ip_addr: Ipv4Address,
    neighbors: Cache,
    /// Datagrams waiting on neighbor resolution, per next hop.
    waiting: BTreeMap<Ipv4Address, VecDeque<ipv4::Packet>>,
    outbound: VecDeque<ethernet::Frame>,
    now: Instant,
}

impl Interface {
    /// Create an interface with the given hardware and protocol address.
    pub fn new(hardware_addr: EthernetAddress, ip_addr: Ipv4Address) -> Self {
        net_debug!("interface up, hardware {} protocol {}", hardware_addr, ip_addr);
        Interface {
            hardware_addr,
            ip_addr,
            neighbors: Cache::new(),
            waiting: BTreeMap::new(),
            outbound: VecDeque::new(),
            now: Instant::from_millis(0),
        }
    }

    /// Our own hardware address.
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.hardware_addr
    }

    /// Our own protocol address.
    pub fn ip_addr(&self) -> Ipv4Address {
        self.ip_addr
    }

    /// Send a datagram towards `next_hop` on this link.
    ///
    /// With the next hop resolved the frame goes straight onto the outbound
    /// queue. Otherwise the datagram is parked and at most one ARP request
    /// per [`Cache::REQUEST_LIFETIME`] is broadcast for the address.
    pub fn send_datagram(&mut self, datagram: ipv4::Packet, next_hop: Ipv4Address) {
        match self.neighbors.lookup(next_hop, self.now) {
            Answer::Found(dst_addr) => self.enqueue_ipv4(dst_addr, datagram),
            Answer::RateLimited => {
                self.waiting.entry(next_hop).or_default().push_back(datagram);
            }
            Answer::NotFound => {
                self.waiting.entry(next_hop).or_default().push_back(datagram);
                self.send_arp(
                    arp::Operation::Request,
                    EthernetAddress::BROADCAST,
                    // The target hardware address is what we are asking for.
                    EthernetAddress::default(),
                    next_hop,
                );
                self.neighbors.requesting(next_hop, self.now);
            }
        }
    }

    /// Accept one frame from the wire.
    ///
    /// Frames addressed to neither us nor the broadcast address are
    /// discarded, as is anything that fails to parse. An IPv4 payload is
    /// handed back to the caller; ARP is handled internally.
    pub fn recv_frame(&mut self, frame: &[u8]) -> Option<ipv4::Packet> {
        let frame = ethernet::frame::new_checked(frame).ok()?;
        let dst_addr = frame.dst_addr();
        if dst_addr != self.hardware_addr && !dst_addr.is_broadcast() {
            return None;
        }

        match frame.ethertype() {
            ethernet::EtherType::Ipv4 => {
                ipv4::Packet::new_checked(frame.payload_slice().to_vec()).ok()
            }
            ethernet::EtherType::Arp => {
                self.recv_arp(frame.payload_slice());
                None
            }
            _ => None,
        }
    }

    /// Report elapsed time; ages out resolved neighbors and stale requests.
    pub fn tick(&mut self, elapsed: Duration) {
        self.now += elapsed;
        self.neighbors.evict_expired(self.now);
    }

    /// Pop the next frame bound for the wire.
    pub fn maybe_send(&mut self) -> Option<ethernet::Frame> {
        self.outbound.pop_front()
    }

    fn recv_arp(&mut self, payload: &[u8]) {
        let packet = match arp::packet::new_checked(payload) {
            Ok(packet) => packet,
            Err(_) => return,
        };
        let repr = match arp::Repr::parse(packet) {
            Ok(repr) => repr,
            Err(_) => return,
        };
        let arp::Repr::EthernetIpv4 {
            operation,
            source_hardware_addr,
            source_protocol_addr,
            target_protocol_addr,
            ..
        } = repr;

        // Any supported ARP message vouches for its sender's mapping.
        net_debug!("neighbor {} is at {}", source_protocol_addr, source_hardware_addr);
        self.neighbors.fill(source_protocol_addr, source_hardware_addr, self.now);

        // Datagrams held for this neighbor leave now, in submission order.
        if let Some(mut queue) = self.waiting.remove(&source_protocol_addr) {
            while let Some(datagram) = queue.pop_front() {
                self.enqueue_ipv4(source_hardware_addr, datagram);
            }
        }

        if operation == arp::Operation::Request && target_protocol_addr == self.ip_addr {
            self.send_arp(
                arp::Operation::Reply,
                source_hardware_addr,
                source_hardware_addr,
                source_protocol_addr,
            );
        }
    }

    fn enqueue_ipv4(&mut self, dst_addr: EthernetAddress, datagram: ipv4::Packet) {
        let repr = ethernet::Repr {
            src_addr: self.hardware_addr,
            dst_addr,
            ethertype: ethernet::EtherType::Ipv4,
        };
        self.outbound.push_back(ethernet::Frame::new(repr, datagram.into_inner()));
    }

    fn send_arp(
        &mut self,
        operation: arp::Operation,
        frame_dst: EthernetAddress,
        target_hardware_addr: EthernetAddress,
        target_protocol_addr: Ipv4Address,
    ) {
        let repr = arp::Repr::EthernetIpv4 {
            operation,
            source_hardware_addr: self.hardware_addr,
            source_protocol_addr: self.ip_addr,
            target_hardware_addr,
            target_protocol_addr,
        };
        let mut payload = vec![0; repr.buffer_len()];
        repr.emit(arp::packet::new_unchecked_mut(&mut payload));

        let header = ethernet::Repr {
            src_addr: self.hardware_addr,
            dst_addr: frame_dst,
            ethertype: ethernet::EtherType::Arp,
        };
        self.outbound.push_back(ethernet::Frame::new(header, payload));
    }
}
