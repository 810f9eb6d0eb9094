use std::net::{IpAddr, Ipv4Addr};

use super::layer::{Dissection, Endpoints, Field, LayerKind};
use super::names::ip_protocol_label;

const MIN_HEADER_LEN: usize = 20;

pub(crate) fn dissect(payload: &[u8]) -> Option<Dissection> {
    if payload.len() < MIN_HEADER_LEN {
        return None;
    }

    let version = payload[0] >> 4;
    let ihl = payload[0] & 0x0F;
    let ip_header_len = (ihl as usize) * 4;

    if version != 4 || ip_header_len < MIN_HEADER_LEN || payload.len() < ip_header_len {
        return None;
    }

    let total_len = u16::from_be_bytes([payload[2], payload[3]]);
    let id = u16::from_be_bytes([payload[4], payload[5]]);
    let flags_frag = u16::from_be_bytes([payload[6], payload[7]]);
    let fragment_offset = flags_frag & 0x1FFF;
    let ttl = payload[8];
    let protocol = payload[9];
    let checksum = u16::from_be_bytes([payload[10], payload[11]]);
    let src = Ipv4Addr::new(payload[12], payload[13], payload[14], payload[15]);
    let dst = Ipv4Addr::new(payload[16], payload[17], payload[18], payload[19]);

    let mut fields = vec![
        Field::new("version", version),
        Field::new("ihl", ihl),
        Field::new("tos", format!("0x{:02x}", payload[1])),
        Field::new("len", total_len),
        Field::new("id", id),
        Field::new("flags", render_flags(flags_frag >> 13)),
        Field::new("frag", fragment_offset),
        Field::new("ttl", ttl),
        Field::new("proto", ip_protocol_label(protocol)),
        Field::new("chksum", format!("0x{:04x}", checksum)),
        Field::new("src", src),
        Field::new("dst", dst),
    ];
    if ip_header_len > MIN_HEADER_LEN {
        fields.push(Field::new(
            "options",
            format!("{} bytes", ip_header_len - MIN_HEADER_LEN),
        ));
    }

    // later fragments carry no transport header
    let next = if fragment_offset == 0 {
        next_for_protocol(protocol)
    } else {
        None
    };

    let mut dissection = Dissection::new(fields, ip_header_len)
        .next(next)
        .endpoints(Endpoints::Network {
            src: IpAddr::V4(src),
            dst: IpAddr::V4(dst),
            protocol,
        });
    // TSO-offloaded frames report a zero total length
    if total_len as usize >= ip_header_len {
        dissection = dissection.extent(total_len as usize);
    }

    Some(dissection)
}

/// Layer carried by an IP protocol number, shared with IPv6.
pub(crate) fn next_for_protocol(protocol: u8) -> Option<LayerKind> {
    match protocol {
        1 => Some(LayerKind::Icmp),
        4 => Some(LayerKind::Ipv4),
        6 => Some(LayerKind::Tcp),
        17 => Some(LayerKind::Udp),
        41 => Some(LayerKind::Ipv6),
        58 => Some(LayerKind::Icmpv6),
        _ => None,
    }
}

fn render_flags(bits: u16) -> String {
    let mut flags = vec![];
    if bits & 0b100 != 0 {
        flags.push("evil");
    }
    if bits & 0b010 != 0 {
        flags.push("DF");
    }
    if bits & 0b001 != 0 {
        flags.push("MF");
    }

    if flags.is_empty() {
        "0".to_string()
    } else {
        flags.join("|")
    }
}
