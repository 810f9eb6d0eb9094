use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use super::ethernet::format_mac;
use super::layer::{Endpoints, LayerKind};
use super::CapturedPacket;

/// A source or destination as shown in the packet list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    Ip(IpAddr),
    Mac([u8; 6]),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Ip(ip) => write!(f, "{}", ip),
            Address::Mac(mac) => f.write_str(&format_mac(mac)),
        }
    }
}

/// Read-only row view of a `CapturedPacket`.
///
/// Addresses come from the outermost IP layer, or the link layer when there
/// is none. Ports are set only when a TCP or UDP header of the packet itself
/// decoded; headers quoted inside an ICMP error only show up in `info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketSummary {
    pub sequence: u64,
    pub source: Option<Address>,
    pub destination: Option<Address>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    /// Protocol number of the outermost IP header.
    pub ip_protocol: Option<u8>,
    /// Innermost non-pseudo, non-quoted layer, or the link type name if
    /// nothing decoded.
    pub protocol: String,
    pub main_layer: Option<LayerKind>,
    pub length: usize,
    pub wire_length: u32,
    pub elapsed: Duration,
    pub info: String,
}

impl PacketSummary {
    pub(crate) fn from_packet(packet: &CapturedPacket) -> Self {
        let mut link: Option<([u8; 6], [u8; 6])> = None;
        let mut network: Option<(IpAddr, IpAddr, u8)> = None;
        let mut ports: Option<(u16, u16)> = None;
        let mut main_layer = None;
        let mut tcp_flags = None;
        let mut names = Vec::new();

        for layer in packet.layers() {
            if layer.is_quoted() {
                if !layer.is_pseudo() {
                    names.push(layer.label());
                }
                continue;
            }

            match layer.endpoints() {
                Some(Endpoints::Link { src, dst }) if link.is_none() => link = Some((src, dst)),
                Some(Endpoints::Network { src, dst, protocol }) if network.is_none() => {
                    network = Some((src, dst, protocol))
                }
                Some(Endpoints::Transport { src, dst }) if ports.is_none() => {
                    ports = Some((src, dst));
                    if layer.kind() == LayerKind::Tcp {
                        tcp_flags = layer.field("flags").map(str::to_string);
                    }
                }
                _ => {}
            }
            if !layer.is_pseudo() {
                main_layer = Some(layer.kind());
                names.push(layer.label());
            }
        }

        let (source, destination) = match (network, link) {
            (Some((src, dst, _)), _) => (Some(Address::Ip(src)), Some(Address::Ip(dst))),
            (None, Some((src, dst))) => (Some(Address::Mac(src)), Some(Address::Mac(dst))),
            (None, None) => (None, None),
        };

        let protocol = match main_layer {
            Some(kind) => kind.name().to_string(),
            None => packet.link_type().name().to_string(),
        };

        let mut info = if names.is_empty() {
            format!("{} bytes undecoded", packet.len())
        } else {
            names.join(" / ")
        };
        if let Some((src, dst)) = ports {
            info.push_str(&format!(" {} > {}", src, dst));
        }
        if let Some(flags) = tcp_flags.filter(|flags| !flags.is_empty()) {
            info.push_str(&format!(" [{}]", flags));
        }

        Self {
            sequence: packet.sequence(),
            source,
            destination,
            src_port: ports.map(|(src, _)| src),
            dst_port: ports.map(|(_, dst)| dst),
            ip_protocol: network.map(|(_, _, protocol)| protocol),
            protocol,
            main_layer,
            length: packet.len(),
            wire_length: packet.wire_len(),
            elapsed: packet.elapsed(),
            info,
        }
    }

    pub fn source_text(&self) -> String {
        self.source.map_or_else(|| "?".to_string(), |addr| addr.to_string())
    }

    pub fn destination_text(&self) -> String {
        self.destination
            .map_or_else(|| "?".to_string(), |addr| addr.to_string())
    }

    /// Seconds since the session started, with microsecond precision.
    pub fn elapsed_text(&self) -> String {
        format!("{:.6}", self.elapsed.as_secs_f64())
    }
}
