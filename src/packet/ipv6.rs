use std::net::{IpAddr, Ipv6Addr};

use super::ipv4;
use super::layer::{Dissection, Endpoints, Field, LayerKind};
use super::names::ip_protocol_label;

const HEADER_LEN: usize = 40;
const FRAGMENT_HEADER_LEN: usize = 8;

const HOP_BY_HOP: u8 = 0;
const ROUTING: u8 = 43;
const FRAGMENT: u8 = 44;
const DESTINATION_OPTIONS: u8 = 60;

pub(crate) fn dissect(payload: &[u8]) -> Option<Dissection> {
    if payload.len() < HEADER_LEN || payload[0] >> 4 != 6 {
        return None;
    }

    let first_word = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let traffic_class = (first_word >> 20) & 0xFF;
    let flow_label = first_word & 0x000F_FFFF;
    let payload_len = u16::from_be_bytes([payload[4], payload[5]]);
    let next_header = payload[6];
    let hop_limit = payload[7];

    let src = ipv6_at(payload, 8)?;
    let dst = ipv6_at(payload, 24)?;

    let mut dissection = Dissection::new(
        vec![
            Field::new("version", 6),
            Field::new("tc", traffic_class),
            Field::new("fl", flow_label),
            Field::new("plen", payload_len),
            Field::new("nh", ip_protocol_label(next_header)),
            Field::new("hlim", hop_limit),
            Field::new("src", src),
            Field::new("dst", dst),
        ],
        HEADER_LEN,
    )
    .next(next_for_header(next_header))
    .endpoints(Endpoints::Network {
        src: IpAddr::V6(src),
        dst: IpAddr::V6(dst),
        protocol: next_header,
    });
    // zero payload length means a jumbogram (or offload); trust the capture
    if payload_len > 0 {
        dissection = dissection.extent(HEADER_LEN + payload_len as usize);
    }

    Some(dissection)
}

/// Hop-by-hop, routing, fragment and destination-options headers.
pub(crate) fn dissect_extension(header: u8, data: &[u8]) -> Option<Dissection> {
    if data.len() < 2 {
        return None;
    }

    let next_header = data[0];

    if header == FRAGMENT {
        if data.len() < FRAGMENT_HEADER_LEN {
            return None;
        }
        let offset_flags = u16::from_be_bytes([data[2], data[3]]);
        let offset = offset_flags >> 3;
        let more = offset_flags & 0x1 != 0;
        let id = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let next = if offset == 0 { next_for_header(next_header) } else { None };

        return Some(
            Dissection::new(
                vec![
                    Field::new("nh", ip_protocol_label(next_header)),
                    Field::new("offset", offset),
                    Field::new("m", u8::from(more)),
                    Field::new("id", format!("0x{:08x}", id)),
                ],
                FRAGMENT_HEADER_LEN,
            )
            .next(next),
        );
    }

    let len = (data[1] as usize + 1) * 8;
    if data.len() < len {
        return None;
    }

    Some(
        Dissection::new(
            vec![
                Field::new("nh", ip_protocol_label(next_header)),
                Field::new("len", len),
            ],
            len,
        )
        .next(next_for_header(next_header)),
    )
}

pub(crate) fn extension_name(header: u8) -> &'static str {
    match header {
        HOP_BY_HOP => "IPv6 Hop-by-Hop",
        ROUTING => "IPv6 Routing",
        FRAGMENT => "IPv6 Fragment",
        DESTINATION_OPTIONS => "IPv6 Destination Options",
        _ => "IPv6 Extension",
    }
}

fn next_for_header(next_header: u8) -> Option<LayerKind> {
    match next_header {
        HOP_BY_HOP | ROUTING | FRAGMENT | DESTINATION_OPTIONS => {
            Some(LayerKind::Ipv6Ext(next_header))
        }
        other => ipv4::next_for_protocol(other),
    }
}

fn ipv6_at(payload: &[u8], offset: usize) -> Option<Ipv6Addr> {
    let octets: [u8; 16] = payload.get(offset..offset + 16)?.try_into().ok()?;
    Some(Ipv6Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::{ethernet, ipv6, udp};
    use crate::packet::{decompose_bytes, LinkType};

    #[test]
    fn test_udp_over_ipv6() {
        let frame = ethernet(0x86DD, &ipv6(17, "fe80::1", "ff02::fb", &udp(5353, 5353, &[0; 4])));
        let layers: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet).collect();
        assert_eq!(layers[1].kind(), LayerKind::Ipv6);
        assert_eq!(layers[1].field("src"), Some("fe80::1"));
        assert_eq!(layers[1].field("dst"), Some("ff02::fb"));
        assert_eq!(layers[1].field("nh"), Some("17 (UDP)"));
        assert_eq!(layers[2].kind(), LayerKind::Udp);
    }

    #[test]
    fn test_hop_by_hop_extension_walked() {
        let mut hop = vec![58, 0, 0, 0, 0, 0, 0, 0];
        hop.extend_from_slice(&[128, 0, 0, 0, 0, 1, 0, 1]);
        let frame = ethernet(0x86DD, &ipv6(0, "fe80::1", "ff02::fb", &hop));
        let names: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet)
            .map(|layer| layer.name())
            .collect();
        assert_eq!(names, vec!["Ethernet", "IPv6", "IPv6 Hop-by-Hop", "ICMPv6"]);
    }

    #[test]
    fn test_short_header_rejected() {
        assert!(dissect(&[0x60; 39]).is_none());
    }
}
