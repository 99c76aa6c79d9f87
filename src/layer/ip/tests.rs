use crate::layer::eth::Interface;
use crate::wire::{arp, ethernet, ipv4};
use crate::wire::{EthernetAddress, Ipv4Address};

use super::Router;

const MAC_A: EthernetAddress = EthernetAddress([0xa, 0, 0, 0, 0, 1]);
const IP_A: Ipv4Address = Ipv4Address([192, 168, 0, 1]);
const MAC_B: EthernetAddress = EthernetAddress([0xb0, 0, 0, 0, 0, 1]);
const IP_B: Ipv4Address = Ipv4Address([10, 0, 0, 1]);

const MAC_PEER: EthernetAddress = EthernetAddress([0xee, 0, 0, 0, 0, 9]);
const GATEWAY: Ipv4Address = Ipv4Address([192, 168, 0, 254]);

/// A router with interface A on 192.168.0.0/24 (default route via the
/// gateway there) and interface B directly on 10.0.0.0/8.
fn two_port_router() -> Router {
    let mut router = Router::new();
    let a = router.add_interface(Interface::new(MAC_A, IP_A));
    let b = router.add_interface(Interface::new(MAC_B, IP_B));
    router.add_route(ipv4::Cidr::new(Ipv4Address::UNSPECIFIED, 0), Some(GATEWAY), a);
    router.add_route(ipv4::Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), None, b);
    router
}

fn datagram(dst_addr: Ipv4Address, hop_limit: u8) -> Vec<u8> {
    let repr = ipv4::Repr {
        src_addr: Ipv4Address::new(172, 16, 0, 1),
        dst_addr,
        protocol: ipv4::Protocol::Udp,
        hop_limit,
        payload_len: 4,
    };
    let mut bytes = vec![0; repr.buffer_len()];
    {
        let view = ipv4::packet::new_unchecked_mut(&mut bytes);
        repr.emit(view);
        view.payload_mut_slice().copy_from_slice(b"ping");
    }
    bytes
}

/// Wrap a datagram in a frame addressed to the interface with `dst_addr`.
fn frame_to(dst_addr: EthernetAddress, datagram: Vec<u8>) -> Vec<u8> {
    let header = ethernet::Repr {
        src_addr: MAC_PEER,
        dst_addr,
        ethertype: ethernet::EtherType::Ipv4,
    };
    ethernet::Frame::new(header, datagram).to_bytes()
}

fn arp_teaching(interface_mac: EthernetAddress, neighbor: (EthernetAddress, Ipv4Address)) -> Vec<u8> {
    let repr = arp::Repr::EthernetIpv4 {
        operation: arp::Operation::Reply,
        source_hardware_addr: neighbor.0,
        source_protocol_addr: neighbor.1,
        target_hardware_addr: interface_mac,
        target_protocol_addr: Ipv4Address::UNSPECIFIED,
    };
    let mut payload = vec![0; repr.buffer_len()];
    repr.emit(arp::packet::new_unchecked_mut(&mut payload));
    let header = ethernet::Repr {
        src_addr: neighbor.0,
        dst_addr: interface_mac,
        ethertype: ethernet::EtherType::Arp,
    };
    ethernet::Frame::new(header, payload).to_bytes()
}

#[test]
fn longest_prefix_picks_the_egress() {
    let mut router = two_port_router();

    // 10.1.2.3 matches both routes; the /8 is more specific than the
    // default, so it leaves through interface B.
    router.receive_frame(0, &frame_to(MAC_A, datagram(Ipv4Address::new(10, 1, 2, 3), 64)));
    router.route();

    let frame = router.interface_mut(1).maybe_send().expect("egress on interface B");
    assert_eq!(frame.repr.ethertype, ethernet::EtherType::Arp);
    let arp::Repr::EthernetIpv4 { target_protocol_addr, .. } =
        arp::Repr::parse(arp::packet::new_checked(&frame.payload).unwrap()).unwrap();
    // Direct route: the next hop is the destination itself.
    assert_eq!(target_protocol_addr, Ipv4Address::new(10, 1, 2, 3));
    assert_eq!(router.interface_mut(0).maybe_send(), None);

    // 8.8.8.8 only matches the default route and goes to the gateway on A.
    router.receive_frame(1, &frame_to(MAC_B, datagram(Ipv4Address::new(8, 8, 8, 8), 64)));
    router.route();

    let frame = router.interface_mut(0).maybe_send().expect("egress on interface A");
    let arp::Repr::EthernetIpv4 { target_protocol_addr, .. } =
        arp::Repr::parse(arp::packet::new_checked(&frame.payload).unwrap()).unwrap();
    assert_eq!(target_protocol_addr, GATEWAY);
    assert_eq!(router.interface_mut(1).maybe_send(), None);
}

#[test]
fn forwarding_rewrites_ttl_and_checksum() {
    let mut router = two_port_router();

    // Teach interface B its neighbor first so the datagram leaves at once.
    let dst = Ipv4Address::new(10, 1, 2, 3);
    router.receive_frame(1, &arp_teaching(MAC_B, (MAC_PEER, dst)));

    router.receive_frame(0, &frame_to(MAC_A, datagram(dst, 64)));
    router.route();

    let frame = router.interface_mut(1).maybe_send().unwrap();
    assert_eq!(frame.repr.dst_addr, MAC_PEER);
    let forwarded = ipv4::Packet::new_checked(frame.payload).unwrap();
    assert_eq!(forwarded.hop_limit(), 63);
    assert!(forwarded.verify_checksum());
    assert_eq!(forwarded.dst_addr(), dst);
    assert_eq!(forwarded.payload_slice(), b"ping");
}

#[test]
fn expiring_ttl_drops_the_datagram() {
    let mut router = two_port_router();
    let dst = Ipv4Address::new(10, 1, 2, 3);
    router.receive_frame(1, &arp_teaching(MAC_B, (MAC_PEER, dst)));

    router.receive_frame(0, &frame_to(MAC_A, datagram(dst, 1)));
    router.receive_frame(0, &frame_to(MAC_A, datagram(dst, 0)));
    router.route();

    assert_eq!(router.interface_mut(1).maybe_send(), None);
    assert_eq!(router.interface_mut(0).maybe_send(), None);
}

#[test]
fn unroutable_destinations_are_dropped() {
    let mut router = Router::new();
    let a = router.add_interface(Interface::new(MAC_A, IP_A));
    router.add_route(ipv4::Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), None, a);

    router.receive_frame(0, &frame_to(MAC_A, datagram(Ipv4Address::new(11, 0, 0, 1), 64)));
    router.route();
    assert_eq!(router.interface_mut(0).maybe_send(), None);
}

#[test]
fn equal_prefixes_prefer_the_later_route() {
    let mut router = Router::new();
    let a = router.add_interface(Interface::new(MAC_A, IP_A));
    let b = router.add_interface(Interface::new(MAC_B, IP_B));
    router.add_route(ipv4::Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), None, a);
    router.add_route(ipv4::Cidr::new(Ipv4Address::new(10, 0, 0, 0), 8), None, b);

    router.receive_frame(0, &frame_to(MAC_A, datagram(Ipv4Address::new(10, 5, 5, 5), 64)));
    router.route();
    assert!(router.interface_mut(1).maybe_send().is_some());
    assert_eq!(router.interface_mut(0).maybe_send(), None);
}
