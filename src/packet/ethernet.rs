use super::layer::{Dissection, Endpoints, Field, LayerKind};
use super::names::ether_type_label;

const HEADER_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;

/// Ethernet II header: destination, source, EtherType.
pub(crate) fn dissect(data: &[u8]) -> Option<Dissection> {
    if data.len() < HEADER_LEN {
        return None;
    }

    let dst = array_from_slice(&data[0..6])?;
    let src = array_from_slice(&data[6..12])?;
    let ethertype = u16::from_be_bytes([data[12], data[13]]);

    Some(
        Dissection::new(
            vec![
                Field::new("dst", format_mac(&dst)),
                Field::new("src", format_mac(&src)),
                Field::new("type", ether_type_label(ethertype)),
            ],
            HEADER_LEN,
        )
        .next(next_for_ether_type(ethertype))
        .endpoints(Endpoints::Link { src, dst }),
    )
}

/// 802.1Q / 802.1ad tag following an Ethernet header.
pub(crate) fn dissect_vlan(data: &[u8]) -> Option<Dissection> {
    if data.len() < VLAN_TAG_LEN {
        return None;
    }

    let tci = u16::from_be_bytes([data[0], data[1]]);
    let ethertype = u16::from_be_bytes([data[2], data[3]]);

    Some(
        Dissection::new(
            vec![
                Field::new("prio", tci >> 13),
                Field::new("dei", (tci >> 12) & 0x1),
                Field::new("vlan", tci & 0x0fff),
                Field::new("type", ether_type_label(ethertype)),
            ],
            VLAN_TAG_LEN,
        )
        .next(next_for_ether_type(ethertype)),
    )
}

pub(crate) fn next_for_ether_type(ethertype: u16) -> Option<LayerKind> {
    match ethertype {
        0x0800 => Some(LayerKind::Ipv4),
        0x86DD => Some(LayerKind::Ipv6),
        0x0806 => Some(LayerKind::Arp),
        0x8100 | 0x88A8 => Some(LayerKind::Vlan),
        _ => None,
    }
}

/// Utility: turn 6-byte slice into MAC array
pub(crate) fn array_from_slice(slice: &[u8]) -> Option<[u8; 6]> {
    slice.try_into().ok()
}

pub fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::{ethernet, MAC_A, MAC_B};

    #[test]
    fn test_ethernet_fields() {
        let frame = ethernet(0x0806, &[]);
        let dissection = dissect(&frame).unwrap();
        assert_eq!(dissection.header_len, 14);
        assert_eq!(dissection.next, Some(LayerKind::Arp));
        assert_eq!(dissection.fields[0].value, "66:77:88:99:aa:bb");
        assert_eq!(dissection.fields[1].value, "00:11:22:33:44:55");
        assert_eq!(dissection.fields[2].value, "0x0806 (ARP)");
        assert_eq!(
            dissection.endpoints,
            Some(Endpoints::Link { src: MAC_A, dst: MAC_B })
        );
    }

    #[test]
    fn test_short_header_rejected() {
        assert!(dissect(&[0u8; 13]).is_none());
    }

    #[test]
    fn test_array_from_slice() {
        assert_eq!(array_from_slice(&[1, 2, 3, 4, 5, 6]), Some([1, 2, 3, 4, 5, 6]));
        assert_eq!(array_from_slice(&[1, 2, 3]), None);
    }
}
