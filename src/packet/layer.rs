use std::fmt;
use std::net::IpAddr;

use super::{arp, dns, ethernet, hexdump, icmp, ipv4, ipv6, link, tcp, udp};
use super::{CapturedPacket, LinkType};

/// Upper bound on layers per frame. Every layer consumes at least one byte,
/// so this only matters for pathological tunnels.
const MAX_LAYERS: usize = 64;

/// Maximum number of payload bytes rendered in a pseudo-layer's `load` field.
const LOAD_PREVIEW: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Ethernet,
    Vlan,
    Loopback,
    LinuxSll,
    Arp,
    Ipv4,
    Ipv6,
    /// IPv6 extension header, tagged with its next-header value.
    Ipv6Ext(u8),
    Tcp,
    Udp,
    Icmp,
    Icmpv6,
    Dns,
    Raw,
    Padding,
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Ethernet => "Ethernet",
            LayerKind::Vlan => "802.1Q",
            LayerKind::Loopback => "Loopback",
            LayerKind::LinuxSll => "Linux SLL",
            LayerKind::Arp => "ARP",
            LayerKind::Ipv4 => "IPv4",
            LayerKind::Ipv6 => "IPv6",
            LayerKind::Ipv6Ext(header) => ipv6::extension_name(*header),
            LayerKind::Tcp => "TCP",
            LayerKind::Udp => "UDP",
            LayerKind::Icmp => "ICMP",
            LayerKind::Icmpv6 => "ICMPv6",
            LayerKind::Dns => "DNS",
            LayerKind::Raw => "Raw",
            LayerKind::Padding => "Padding",
        }
    }

    /// Pseudo-layers carry bytes, not protocol headers.
    pub fn is_pseudo(&self) -> bool {
        matches!(self, LayerKind::Raw | LayerKind::Padding)
    }

    /// Error messages that carry the offending datagram after their header.
    fn quotes_datagram(&self) -> bool {
        matches!(self, LayerKind::Icmp | LayerKind::Icmpv6)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One named field of a layer, with its value already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(name: &'static str, value: impl fmt::Display) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Addressing information a layer contributes to the packet summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoints {
    Link { src: [u8; 6], dst: [u8; 6] },
    Network { src: IpAddr, dst: IpAddr, protocol: u8 },
    Transport { src: u16, dst: u16 },
}

/// What a dissector learned about the bytes at the current position.
#[derive(Debug)]
pub(crate) struct Dissection {
    pub fields: Vec<Field>,
    pub header_len: usize,
    /// Length the header claims for itself plus its payload.
    pub extent: Option<usize>,
    pub next: Option<LayerKind>,
    pub endpoints: Option<Endpoints>,
}

impl Dissection {
    pub fn new(fields: Vec<Field>, header_len: usize) -> Self {
        Self {
            fields,
            header_len,
            extent: None,
            next: None,
            endpoints: None,
        }
    }

    pub fn extent(mut self, extent: usize) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn next(mut self, next: Option<LayerKind>) -> Self {
        self.next = next;
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }
}

/// One decoded encapsulation level.
///
/// `bytes` spans the header and everything it encapsulates, so a hex dump of
/// an IPv4 layer includes its TCP segment.
///
/// A quoted layer belongs to the datagram an ICMP error message carries
/// back to its sender, not to the packet itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer<'a> {
    kind: LayerKind,
    fields: Vec<Field>,
    bytes: &'a [u8],
    header_len: usize,
    endpoints: Option<Endpoints>,
    quoted_by: Option<LayerKind>,
}

impl<'a> Layer<'a> {
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn header(&self) -> &'a [u8] {
        let bytes = self.bytes;
        &bytes[..self.header_len]
    }

    pub fn payload(&self) -> &'a [u8] {
        let bytes = self.bytes;
        &bytes[self.header_len..]
    }

    pub fn endpoints(&self) -> Option<Endpoints> {
        self.endpoints
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind.is_pseudo()
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted_by.is_some()
    }

    /// Display name, e.g. `UDP in ICMP` for a quoted header.
    pub fn label(&self) -> String {
        match self.quoted_by {
            Some(quoting) => format!("{} in {}", self.name(), quoting.name()),
            None => self.name().to_string(),
        }
    }

    pub fn hexdump(&self) -> String {
        hexdump(self.bytes)
    }
}

/// Lazy iterator over a frame's layers. A clone continues from the same
/// position; call `decompose` again to walk from the outermost layer.
///
/// Each dissector sees only the bytes left inside the enclosing layer's
/// claimed length. Bytes past that length become a `Padding` layer, and
/// payload nothing can decode becomes `Raw`.
#[derive(Debug, Clone)]
pub struct Layers<'a> {
    data: &'a [u8],
    cursor: usize,
    limit: usize,
    pending: Option<LayerKind>,
    emitted: usize,
    quoted_by: Option<LayerKind>,
}

impl<'a> Layers<'a> {
    fn new(data: &'a [u8], link_type: LinkType) -> Self {
        Self {
            data,
            cursor: 0,
            limit: data.len(),
            pending: link::first_layer(link_type, data),
            emitted: 0,
            quoted_by: None,
        }
    }

    fn dissect_next(&mut self, kind: LayerKind) -> Layer<'a> {
        let data = self.data;
        let start = self.cursor;
        let window = &data[start..self.limit];

        match dissect(kind, window) {
            Some(dissection) => {
                let end = match dissection.extent {
                    Some(extent) => (start + extent.max(dissection.header_len)).min(self.limit),
                    None => self.limit,
                };
                let header_end = (start + dissection.header_len).min(end);

                self.limit = end;
                self.cursor = header_end;
                self.pending = dissection.next;

                let layer = Layer {
                    kind,
                    fields: dissection.fields,
                    bytes: &data[start..end],
                    header_len: header_end - start,
                    endpoints: dissection.endpoints,
                    quoted_by: self.quoted_by,
                };
                if self.quoted_by.is_none() && kind.quotes_datagram() && dissection.next.is_some() {
                    self.quoted_by = Some(kind);
                }
                layer
            }
            // application payload that doesn't parse is still payload
            None if kind == LayerKind::Dns => self.pseudo(LayerKind::Raw, self.limit),
            None => self.pseudo(LayerKind::Padding, self.data.len()),
        }
    }

    fn pseudo(&mut self, kind: LayerKind, end: usize) -> Layer<'a> {
        let data = self.data;
        let bytes = &data[self.cursor..end];
        self.cursor = end;
        self.pending = None;

        Layer {
            kind,
            fields: vec![Field::new("load", render_load(bytes)), Field::new("len", bytes.len())],
            bytes,
            header_len: bytes.len(),
            endpoints: None,
            quoted_by: None,
        }
    }
}

impl<'a> Iterator for Layers<'a> {
    type Item = Layer<'a>;

    fn next(&mut self) -> Option<Layer<'a>> {
        if self.cursor >= self.data.len() {
            return None;
        }

        let layer = if self.cursor < self.limit {
            match self.pending.take() {
                Some(kind) if self.emitted < MAX_LAYERS => self.dissect_next(kind),
                _ => self.pseudo(LayerKind::Raw, self.limit),
            }
        } else {
            self.pseudo(LayerKind::Padding, self.data.len())
        };

        self.emitted += 1;
        Some(layer)
    }
}

/// Walks a captured packet from its link layer inward.
pub fn decompose(packet: &CapturedPacket) -> Layers<'_> {
    Layers::new(packet.data(), packet.link_type())
}

/// Same as [`decompose`] for bytes not wrapped in a `CapturedPacket`.
pub fn decompose_bytes(data: &[u8], link_type: LinkType) -> Layers<'_> {
    Layers::new(data, link_type)
}

/// The innermost layer that is a real protocol header of the packet itself.
pub fn main_protocol(packet: &CapturedPacket) -> Option<LayerKind> {
    decompose(packet)
        .filter(|layer| !layer.is_pseudo() && !layer.is_quoted())
        .last()
        .map(|layer| layer.kind())
}

fn dissect(kind: LayerKind, data: &[u8]) -> Option<Dissection> {
    match kind {
        LayerKind::Ethernet => ethernet::dissect(data),
        LayerKind::Vlan => ethernet::dissect_vlan(data),
        LayerKind::Loopback => link::dissect_loopback(data),
        LayerKind::LinuxSll => link::dissect_sll(data),
        LayerKind::Arp => arp::dissect(data),
        LayerKind::Ipv4 => ipv4::dissect(data),
        LayerKind::Ipv6 => ipv6::dissect(data),
        LayerKind::Ipv6Ext(header) => ipv6::dissect_extension(header, data),
        LayerKind::Tcp => tcp::dissect(data),
        LayerKind::Udp => udp::dissect(data),
        LayerKind::Icmp => icmp::dissect(data),
        LayerKind::Icmpv6 => icmp::dissect_v6(data),
        LayerKind::Dns => dns::dissect(data),
        LayerKind::Raw | LayerKind::Padding => None,
    }
}

fn render_load(bytes: &[u8]) -> String {
    let mut out = String::from("'");
    for &byte in bytes.iter().take(LOAD_PREVIEW) {
        if byte.is_ascii_graphic() || byte == b' ' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("\\x{:02x}", byte));
        }
    }
    out.push('\'');
    if bytes.len() > LOAD_PREVIEW {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::*;
    use std::time::SystemTime;

    fn kinds(data: &[u8]) -> Vec<LayerKind> {
        decompose_bytes(data, LinkType::Ethernet)
            .map(|layer| layer.kind())
            .collect()
    }

    #[test]
    fn test_tcp_with_payload_and_padding() {
        let mut frame = ethernet(
            0x0800,
            &ipv4(6, [10, 0, 0, 1], [10, 0, 0, 2], &tcp(1234, 80, 0x18, b"GET /")),
        );
        frame.extend_from_slice(&[0, 0, 0]);

        assert_eq!(
            kinds(&frame),
            vec![
                LayerKind::Ethernet,
                LayerKind::Ipv4,
                LayerKind::Tcp,
                LayerKind::Raw,
                LayerKind::Padding
            ]
        );

        let layers: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet).collect();
        assert_eq!(layers[3].bytes(), b"GET /");
        assert_eq!(layers[4].bytes(), &[0, 0, 0]);
        // IPv4 extent excludes the trailer
        assert_eq!(layers[1].bytes().len(), 20 + 20 + 5);
        assert_eq!(layers[1].header().len(), 20);
    }

    #[test]
    fn test_malformed_frame_is_single_padding_layer() {
        let layers: Vec<_> = decompose_bytes(&[0xde, 0xad, 0xbe, 0xef], LinkType::Ethernet).collect();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].kind(), LayerKind::Padding);
        assert_eq!(layers[0].field("len"), Some("4"));
    }

    #[test]
    fn test_truncated_ip_header_becomes_padding() {
        let frame = ethernet(0x0800, &[0x45, 0x00, 0x00]);
        assert_eq!(kinds(&frame), vec![LayerKind::Ethernet, LayerKind::Padding]);
    }

    #[test]
    fn test_arp_trailer_is_padding() {
        assert_eq!(
            kinds(&arp_request()),
            vec![LayerKind::Ethernet, LayerKind::Arp, LayerKind::Padding]
        );
    }

    #[test]
    fn test_udp_dns_stack() {
        let frame = udp_dns_frame();
        let layers: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet).collect();
        let names: Vec<_> = layers.iter().map(|layer| layer.name()).collect();
        assert_eq!(names, vec!["Ethernet", "IPv4", "UDP", "DNS"]);
        assert_eq!(layers[3].field("qd"), Some("example.com"));
        assert_eq!(layers[2].field("dport"), Some("53"));
    }

    #[test]
    fn test_garbage_dns_payload_is_raw() {
        let frame = ethernet(
            0x0800,
            &ipv4(17, [10, 0, 0, 1], [10, 0, 0, 2], &udp(53, 53, &[1, 2, 3])),
        );
        assert_eq!(
            kinds(&frame),
            vec![LayerKind::Ethernet, LayerKind::Ipv4, LayerKind::Udp, LayerKind::Raw]
        );
    }

    #[test]
    fn test_vlan_tagged_frame() {
        let mut tag = vec![0x20, 0x64, 0x08, 0x00];
        tag.extend_from_slice(&ipv4(17, [10, 0, 0, 1], [10, 0, 0, 2], &udp(1, 2, b"x")));
        let frame = ethernet(0x8100, &tag);
        let layers: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet).collect();
        assert_eq!(layers[1].kind(), LayerKind::Vlan);
        assert_eq!(layers[1].field("vlan"), Some("100"));
        assert_eq!(layers[1].field("prio"), Some("1"));
        assert_eq!(layers[2].kind(), LayerKind::Ipv4);
    }

    #[test]
    fn test_ip_in_ip_is_walked() {
        let inner = ipv4(6, [192, 168, 0, 1], [192, 168, 0, 2], &tcp(5, 6, 0x10, &[]));
        let outer = ipv4(4, [10, 0, 0, 1], [10, 0, 0, 2], &inner);
        assert_eq!(
            kinds(&ethernet(0x0800, &outer)),
            vec![LayerKind::Ethernet, LayerKind::Ipv4, LayerKind::Ipv4, LayerKind::Tcp]
        );
    }

    #[test]
    fn test_unknown_ethertype_payload_is_raw() {
        assert_eq!(
            kinds(&ethernet(0x88cc, &[1, 2, 3, 4])),
            vec![LayerKind::Ethernet, LayerKind::Raw]
        );
    }

    #[test]
    fn test_decompose_is_restartable() {
        let packet = CapturedPacket::from_raw(udp_dns_frame(), SystemTime::UNIX_EPOCH, 1);
        let first: Vec<_> = decompose(&packet).collect();
        let second: Vec<_> = decompose(&packet).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_main_protocol_skips_pseudo_layers() {
        let frame = ethernet(
            0x0800,
            &ipv4(6, [10, 0, 0, 1], [10, 0, 0, 2], &tcp(1, 2, 0x18, b"data")),
        );
        let packet = CapturedPacket::from_raw(frame, SystemTime::UNIX_EPOCH, 1);
        assert_eq!(main_protocol(&packet), Some(LayerKind::Tcp));

        let junk = CapturedPacket::from_raw(vec![1, 2, 3], SystemTime::UNIX_EPOCH, 2);
        assert_eq!(main_protocol(&junk), None);
    }

    #[test]
    fn test_empty_frame_has_no_layers() {
        assert_eq!(decompose_bytes(&[], LinkType::Ethernet).count(), 0);
    }

    #[test]
    fn test_render_load_escapes_binary() {
        assert_eq!(render_load(b"GET \x00"), "'GET \\x00'");
        assert!(render_load(&[b'a'; 60]).ends_with("'..."));
    }
}
