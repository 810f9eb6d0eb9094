use super::ethernet::{format_mac, next_for_ether_type};
use super::layer::{Dissection, Field, LayerKind};
use super::names::ether_type_label;
use super::LinkType;

const LOOPBACK_HEADER_LEN: usize = 4;
const SLL_HEADER_LEN: usize = 16;

pub(crate) fn first_layer(link_type: LinkType, data: &[u8]) -> Option<LayerKind> {
    match link_type {
        LinkType::Ethernet => Some(LayerKind::Ethernet),
        LinkType::Null | LinkType::Loop => Some(LayerKind::Loopback),
        LinkType::LinuxSll => Some(LayerKind::LinuxSll),
        LinkType::RawIp => ip_by_version(data),
        LinkType::Other(_) => None,
    }
}

fn ip_by_version(data: &[u8]) -> Option<LayerKind> {
    match data.first().map(|byte| byte >> 4) {
        Some(4) => Some(LayerKind::Ipv4),
        Some(6) => Some(LayerKind::Ipv6),
        _ => None,
    }
}

/// BSD loopback: a 4-byte address family. NULL uses host byte order and LOOP
/// network order, so the order is inferred from which half is zero.
pub(crate) fn dissect_loopback(data: &[u8]) -> Option<Dissection> {
    let header: [u8; 4] = data.get(..LOOPBACK_HEADER_LEN)?.try_into().ok()?;
    let family = if header[0] == 0 && header[1] == 0 {
        u32::from_be_bytes(header)
    } else {
        u32::from_le_bytes(header)
    };

    let (label, next) = match family {
        2 => ("2 (IPv4)".to_string(), Some(LayerKind::Ipv4)),
        // BSD variants disagree on AF_INET6
        24 | 28 | 30 => (format!("{} (IPv6)", family), Some(LayerKind::Ipv6)),
        other => (other.to_string(), None),
    };

    Some(Dissection::new(vec![Field::new("family", label)], LOOPBACK_HEADER_LEN).next(next))
}

/// Linux "cooked" capture header used on the `any` pseudo-device.
pub(crate) fn dissect_sll(data: &[u8]) -> Option<Dissection> {
    if data.len() < SLL_HEADER_LEN {
        return None;
    }

    let packet_type = u16::from_be_bytes([data[0], data[1]]);
    let hatype = u16::from_be_bytes([data[2], data[3]]);
    let addr_len = u16::from_be_bytes([data[4], data[5]]) as usize;
    let protocol = u16::from_be_bytes([data[14], data[15]]);

    let addr = &data[6..6 + addr_len.min(8)];
    let src = match <[u8; 6]>::try_from(addr) {
        Ok(mac) => format_mac(&mac),
        Err(_) => addr
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<Vec<_>>()
            .join(":"),
    };

    let direction = match packet_type {
        0 => "0 (unicast to us)",
        1 => "1 (broadcast)",
        2 => "2 (multicast)",
        3 => "3 (to other host)",
        4 => "4 (outgoing)",
        _ => "unknown",
    };

    Some(
        Dissection::new(
            vec![
                Field::new("pkttype", direction),
                Field::new("lladdrtype", format!("0x{:04x}", hatype)),
                Field::new("lladdrlen", addr_len),
                Field::new("src", src),
                Field::new("proto", ether_type_label(protocol)),
            ],
            SLL_HEADER_LEN,
        )
        .next(next_for_ether_type(protocol)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::decompose_bytes;
    use crate::packet::testutil::{ipv4, udp};

    #[test]
    fn test_null_loopback_little_endian() {
        let mut frame = vec![2, 0, 0, 0];
        frame.extend_from_slice(&ipv4(17, [127, 0, 0, 1], [127, 0, 0, 1], &udp(1, 2, &[])));
        let names: Vec<_> = decompose_bytes(&frame, LinkType::Null)
            .map(|layer| layer.name())
            .collect();
        assert_eq!(names, vec!["Loopback", "IPv4", "UDP"]);
    }

    #[test]
    fn test_raw_ip_picks_version() {
        let packet = ipv4(17, [10, 0, 0, 1], [10, 0, 0, 2], &udp(1, 2, &[]));
        assert_eq!(first_layer(LinkType::RawIp, &packet), Some(LayerKind::Ipv4));
        assert_eq!(first_layer(LinkType::RawIp, &[0x60]), Some(LayerKind::Ipv6));
        assert_eq!(first_layer(LinkType::RawIp, &[0x10]), None);
    }

    #[test]
    fn test_sll_header() {
        let mut frame = vec![0, 4, 0, 1, 0, 6, 0, 0x11, 0x22, 0x33, 0x44, 0x55, 0, 0, 0x08, 0x00];
        frame.extend_from_slice(&ipv4(17, [10, 0, 0, 1], [10, 0, 0, 2], &udp(1, 2, &[])));
        let layer = decompose_bytes(&frame, LinkType::LinuxSll).next().unwrap();
        assert_eq!(layer.field("src"), Some("00:11:22:33:44:55"));
        assert_eq!(layer.field("pkttype"), Some("4 (outgoing)"));
        assert_eq!(layer.field("proto"), Some("0x0800 (IPv4)"));
    }

    #[test]
    fn test_unknown_link_type_is_raw() {
        let layers: Vec<_> = decompose_bytes(&[1, 2, 3], LinkType::Other(147)).collect();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].kind(), LayerKind::Raw);
    }
}
