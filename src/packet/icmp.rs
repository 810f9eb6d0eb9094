use super::layer::{Dissection, Field, LayerKind};

const HEADER_LEN: usize = 8;

/// ICMPv4. Error messages quote the offending IP header, which is walked as
/// an inner IPv4 layer.
pub(crate) fn dissect(data: &[u8]) -> Option<Dissection> {
    if data.len() < HEADER_LEN {
        return None;
    }

    let icmp_type = data[0];
    let code = data[1];
    let checksum = u16::from_be_bytes([data[2], data[3]]);

    let type_name = match icmp_type {
        0 => Some("echo-reply"),
        3 => Some("dest-unreach"),
        4 => Some("source-quench"),
        5 => Some("redirect"),
        8 => Some("echo-request"),
        11 => Some("time-exceeded"),
        12 => Some("parameter-problem"),
        13 => Some("timestamp-request"),
        14 => Some("timestamp-reply"),
        _ => None,
    };

    let mut fields = vec![
        Field::new("type", label(icmp_type, type_name)),
        Field::new("code", code),
        Field::new("chksum", format!("0x{:04x}", checksum)),
    ];

    let next = match icmp_type {
        0 | 8 | 13 | 14 => {
            push_echo_fields(&mut fields, data);
            None
        }
        3 | 11 | 12 => Some(LayerKind::Ipv4),
        _ => None,
    };

    Some(Dissection::new(fields, HEADER_LEN).next(next))
}

pub(crate) fn dissect_v6(data: &[u8]) -> Option<Dissection> {
    if data.len() < HEADER_LEN {
        return None;
    }

    let icmp_type = data[0];
    let code = data[1];
    let checksum = u16::from_be_bytes([data[2], data[3]]);

    let type_name = match icmp_type {
        1 => Some("dest-unreach"),
        2 => Some("packet-too-big"),
        3 => Some("time-exceeded"),
        4 => Some("parameter-problem"),
        128 => Some("echo-request"),
        129 => Some("echo-reply"),
        133 => Some("router-solicitation"),
        134 => Some("router-advertisement"),
        135 => Some("neighbor-solicitation"),
        136 => Some("neighbor-advertisement"),
        _ => None,
    };

    let mut fields = vec![
        Field::new("type", label(icmp_type, type_name)),
        Field::new("code", code),
        Field::new("cksum", format!("0x{:04x}", checksum)),
    ];

    let next = match icmp_type {
        128 | 129 => {
            push_echo_fields(&mut fields, data);
            None
        }
        1..=4 => Some(LayerKind::Ipv6),
        _ => None,
    };

    Some(Dissection::new(fields, HEADER_LEN).next(next))
}

fn push_echo_fields(fields: &mut Vec<Field>, data: &[u8]) {
    fields.push(Field::new("id", format!("0x{:04x}", u16::from_be_bytes([data[4], data[5]]))));
    fields.push(Field::new("seq", u16::from_be_bytes([data[6], data[7]])));
}

fn label(value: u8, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{} ({})", value, name),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::{ethernet, ipv4, ipv6, udp};
    use crate::packet::{decompose_bytes, LinkType};

    #[test]
    fn test_echo_request() {
        let dissection = dissect(&[8, 0, 0xf7, 0xfd, 0x00, 0x01, 0x00, 0x02]).unwrap();
        let rendered: Vec<String> = dissection.fields.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["type: 8 (echo-request)", "code: 0", "chksum: 0xf7fd", "id: 0x0001", "seq: 2"]
        );
        assert_eq!(dissection.next, None);
    }

    #[test]
    fn test_error_quotes_inner_packet() {
        let quoted = ipv4(17, [10, 0, 0, 2], [10, 0, 0, 9], &udp(5000, 33434, &[]));
        let mut message = vec![3, 3, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(&quoted);
        let frame = ethernet(0x0800, &ipv4(1, [10, 0, 0, 9], [10, 0, 0, 2], &message));

        let names: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet)
            .map(|layer| layer.name())
            .collect();
        assert_eq!(names, vec!["Ethernet", "IPv4", "ICMP", "IPv4", "UDP"]);
    }

    #[test]
    fn test_quoted_layers_are_labelled() {
        let quoted = ipv4(17, [10, 0, 0, 2], [10, 0, 0, 9], &udp(5000, 33434, &[]));
        let mut message = vec![11, 0, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(&quoted);
        let frame = ethernet(0x0800, &ipv4(1, [10, 0, 0, 9], [10, 0, 0, 2], &message));

        let layers: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet).collect();
        let quoted: Vec<_> = layers.iter().map(|layer| layer.is_quoted()).collect();
        assert_eq!(quoted, vec![false, false, false, true, true]);
        assert_eq!(layers[2].label(), "ICMP");
        assert_eq!(layers[3].label(), "IPv4 in ICMP");
        assert_eq!(layers[4].label(), "UDP in ICMP");
    }

    #[test]
    fn test_icmpv6_error_quotes_inner_packet() {
        let quoted = ipv6(17, "2001:db8::2", "2001:db8::53", &udp(40000, 53, &[]));
        let mut message = vec![1, 4, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(&quoted);
        let frame = ethernet(0x86DD, &ipv6(58, "2001:db8::1", "2001:db8::2", &message));

        let labels: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet)
            .map(|layer| layer.label())
            .collect();
        assert_eq!(labels, vec!["Ethernet", "IPv6", "ICMPv6", "IPv6 in ICMPv6", "UDP in ICMPv6"]);
    }

    #[test]
    fn test_echo_payload_is_not_quoted() {
        let mut message = vec![8, 0, 0, 0, 0, 1, 0, 1];
        message.extend_from_slice(b"ping");
        let frame = ethernet(0x0800, &ipv4(1, [10, 0, 0, 1], [10, 0, 0, 2], &message));

        let layers: Vec<_> = decompose_bytes(&frame, LinkType::Ethernet).collect();
        assert_eq!(layers[3].kind(), LayerKind::Raw);
        assert!(layers.iter().all(|layer| !layer.is_quoted()));
    }

    #[test]
    fn test_icmpv6_echo_reply() {
        let dissection = dissect_v6(&[129, 0, 0, 0, 0, 7, 0, 1]).unwrap();
        assert_eq!(dissection.fields[0].value, "129 (echo-reply)");
        assert_eq!(dissection.fields[4].value, "1");
    }
}
