// src/packet/udp.rs

use super::layer::{Dissection, Endpoints, Field, LayerKind};

const HEADER_LEN: usize = 8;
const DNS_PORT: u16 = 53;
const MDNS_PORT: u16 = 5353;

/// Dissects a UDP header (8 bytes). The length field bounds the datagram,
/// so anything after it is reported as padding.
pub(crate) fn dissect(header: &[u8]) -> Option<Dissection> {
    if header.len() < HEADER_LEN {
        return None;
    }

    let src_port = u16::from_be_bytes([header[0], header[1]]);
    let dst_port = u16::from_be_bytes([header[2], header[3]]);
    let length = u16::from_be_bytes([header[4], header[5]]); // total length incl. header + data
    let checksum = u16::from_be_bytes([header[6], header[7]]);

    let next = if is_dns_port(src_port) || is_dns_port(dst_port) {
        Some(LayerKind::Dns)
    } else {
        None
    };

    let mut dissection = Dissection::new(
        vec![
            Field::new("sport", src_port),
            Field::new("dport", dst_port),
            Field::new("len", length),
            Field::new("chksum", format!("0x{:04x}", checksum)),
        ],
        HEADER_LEN,
    )
    .next(next)
    .endpoints(Endpoints::Transport {
        src: src_port,
        dst: dst_port,
    });
    if length as usize >= HEADER_LEN {
        dissection = dissection.extent(length as usize);
    }

    Some(dissection)
}

fn is_dns_port(port: u16) -> bool {
    port == DNS_PORT || port == MDNS_PORT
}
