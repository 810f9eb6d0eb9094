mod arp;
mod dns;
mod ethernet;
mod hexdump;
mod icmp;
mod ipv4;
mod ipv6;
mod layer;
mod link;
mod names;
mod summary;
mod tcp;
mod udp;

pub use ethernet::format_mac;
pub use hexdump::hexdump;
pub use layer::{decompose, decompose_bytes, main_protocol, Endpoints, Field, Layer, LayerKind, Layers};
pub use names::{ether_type_name, ip_protocol_name};
pub use summary::{Address, PacketSummary};
pub use tcp::TcpFlags;

use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

/// Link-layer header type of a capture, as reported by the capture primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Ethernet,
    /// BSD loopback, 4-byte address family in host byte order.
    Null,
    /// OpenBSD loopback, address family in network byte order.
    Loop,
    RawIp,
    LinuxSll,
    Other(i32),
}

impl LinkType {
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            0 => LinkType::Null,
            1 => LinkType::Ethernet,
            12 | 14 | 101 => LinkType::RawIp,
            108 => LinkType::Loop,
            113 => LinkType::LinuxSll,
            other => LinkType::Other(other),
        }
    }

    pub fn dlt(&self) -> i32 {
        match self {
            LinkType::Null => 0,
            LinkType::Ethernet => 1,
            LinkType::RawIp => 12,
            LinkType::Loop => 108,
            LinkType::LinuxSll => 113,
            LinkType::Other(dlt) => *dlt,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LinkType::Ethernet => "Ethernet",
            LinkType::Null | LinkType::Loop => "Loopback",
            LinkType::RawIp => "Raw IP",
            LinkType::LinuxSll => "Linux SLL",
            LinkType::Other(_) => "Unknown link",
        }
    }
}

impl From<pcap::Linktype> for LinkType {
    fn from(linktype: pcap::Linktype) -> Self {
        LinkType::from_dlt(linktype.0)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Other(dlt) => write!(f, "DLT {}", dlt),
            other => f.write_str(other.name()),
        }
    }
}

/// Immutable snapshot of one captured frame.
///
/// Construction never fails: the raw bytes are stored as-is and every
/// derived view degrades to absent fields when the frame does not decode.
#[derive(Debug, Clone)]
pub struct CapturedPacket {
    data: Vec<u8>,
    timestamp: SystemTime,
    elapsed: Duration,
    sequence: u64,
    wire_len: u32,
    link_type: LinkType,
    summary: OnceLock<PacketSummary>,
}

impl CapturedPacket {
    pub fn from_raw(data: Vec<u8>, timestamp: SystemTime, sequence: u64) -> Self {
        let wire_len = u32::try_from(data.len()).unwrap_or(u32::MAX);
        Self {
            data,
            timestamp,
            elapsed: Duration::ZERO,
            sequence,
            wire_len,
            link_type: LinkType::Ethernet,
            summary: OnceLock::new(),
        }
    }

    pub fn with_link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = link_type;
        self
    }

    /// Time between the owning session's start and this frame.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Length of the frame on the wire, before snaplen truncation.
    pub fn with_wire_len(mut self, wire_len: u32) -> Self {
        self.wire_len = wire_len;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn wire_len(&self) -> u32 {
        self.wire_len
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Summary view, computed on first access and cached.
    pub fn summary(&self) -> &PacketSummary {
        self.summary.get_or_init(|| PacketSummary::from_packet(self))
    }

    pub fn layers(&self) -> Layers<'_> {
        decompose(self)
    }

    pub fn hexdump(&self) -> String {
        hexdump(&self.data)
    }
}

impl fmt::Display for CapturedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        write!(
            f,
            "#{} {} -> {} {} ({} bytes)",
            self.sequence,
            summary.source_text(),
            summary.destination_text(),
            summary.protocol,
            self.data.len()
        )
    }
}

/// Hand-built frames shared by the packet and core tests.
#[cfg(test)]
pub(crate) mod testutil {
    pub const MAC_A: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
    pub const MAC_B: [u8; 6] = [0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb];

    pub fn ethernet(ethertype: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(14 + payload.len());
        frame.extend_from_slice(&MAC_B);
        frame.extend_from_slice(&MAC_A);
        frame.extend_from_slice(&ethertype.to_be_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    pub fn ipv4(protocol: u8, src: [u8; 4], dst: [u8; 4], payload: &[u8]) -> Vec<u8> {
        let total = (20 + payload.len()) as u16;
        let mut header = vec![
            0x45, 0x00, 0, 0, 0x1c, 0x46, 0x40, 0x00, 64, protocol, 0xb1, 0xe6,
        ];
        header[2..4].copy_from_slice(&total.to_be_bytes());
        header.extend_from_slice(&src);
        header.extend_from_slice(&dst);
        header.extend_from_slice(payload);
        header
    }

    pub fn ipv6(next_header: u8, src: &str, dst: &str, payload: &[u8]) -> Vec<u8> {
        let mut packet = vec![0x60, 0x00, 0x00, 0x00];
        packet.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        packet.push(next_header);
        packet.push(64);
        packet.extend_from_slice(&src.parse::<std::net::Ipv6Addr>().unwrap().octets());
        packet.extend_from_slice(&dst.parse::<std::net::Ipv6Addr>().unwrap().octets());
        packet.extend_from_slice(payload);
        packet
    }

    pub fn tcp(src_port: u16, dst_port: u16, flags: u8, payload: &[u8]) -> Vec<u8> {
        let mut segment = Vec::with_capacity(20 + payload.len());
        segment.extend_from_slice(&src_port.to_be_bytes());
        segment.extend_from_slice(&dst_port.to_be_bytes());
        segment.extend_from_slice(&1000u32.to_be_bytes());
        segment.extend_from_slice(&0u32.to_be_bytes());
        segment.push(0x50);
        segment.push(flags);
        segment.extend_from_slice(&65535u16.to_be_bytes());
        segment.extend_from_slice(&[0x12, 0x34, 0x00, 0x00]);
        segment.extend_from_slice(payload);
        segment
    }

    pub fn udp(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
        let len = (8 + payload.len()) as u16;
        let mut datagram = Vec::with_capacity(len as usize);
        datagram.extend_from_slice(&src_port.to_be_bytes());
        datagram.extend_from_slice(&dst_port.to_be_bytes());
        datagram.extend_from_slice(&len.to_be_bytes());
        datagram.extend_from_slice(&[0x00, 0x00]);
        datagram.extend_from_slice(payload);
        datagram
    }

    /// Standard query for `example.com` A/IN.
    pub fn dns_query() -> Vec<u8> {
        let mut msg = vec![0xab, 0xcd, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
        msg.extend_from_slice(b"\x07example\x03com\x00");
        msg.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        msg
    }

    pub fn tcp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
        ethernet(
            0x0800,
            &ipv4(6, [10, 0, 0, 1], [10, 0, 0, 2], &tcp(src_port, dst_port, 0x02, &[])),
        )
    }

    pub fn udp_dns_frame() -> Vec<u8> {
        ethernet(
            0x0800,
            &ipv4(17, [10, 0, 0, 1], [8, 8, 8, 8], &udp(40000, 53, &dns_query())),
        )
    }

    pub fn arp_request() -> Vec<u8> {
        let mut arp = vec![0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01];
        arp.extend_from_slice(&MAC_A);
        arp.extend_from_slice(&[192, 168, 1, 10]);
        arp.extend_from_slice(&[0; 6]);
        arp.extend_from_slice(&[192, 168, 1, 1]);
        // minimum Ethernet frame is 60 bytes without FCS
        arp.resize(46, 0);
        ethernet(0x0806, &arp)
    }
}
