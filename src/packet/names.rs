use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref ETHER_TYPES: HashMap<u16, &'static str> = HashMap::from([
        (0x0800, "IPv4"),
        (0x0806, "ARP"),
        (0x8035, "RARP"),
        (0x8100, "802.1Q"),
        (0x86DD, "IPv6"),
        (0x8847, "MPLS"),
        (0x8863, "PPPoE Discovery"),
        (0x8864, "PPPoE Session"),
        (0x888E, "EAPOL"),
        (0x88A8, "802.1ad"),
        (0x88CC, "LLDP"),
    ]);

    static ref IP_PROTOCOLS: HashMap<u8, &'static str> = HashMap::from([
        (0, "HOPOPT"),
        (1, "ICMP"),
        (2, "IGMP"),
        (4, "IPIP"),
        (6, "TCP"),
        (17, "UDP"),
        (41, "IPv6"),
        (43, "IPv6-Route"),
        (44, "IPv6-Frag"),
        (47, "GRE"),
        (50, "ESP"),
        (51, "AH"),
        (58, "ICMPv6"),
        (59, "IPv6-NoNxt"),
        (60, "IPv6-Opts"),
        (89, "OSPF"),
        (103, "PIM"),
        (112, "VRRP"),
        (132, "SCTP"),
    ]);
}

pub fn ether_type_name(ether_type: u16) -> Option<&'static str> {
    ETHER_TYPES.get(&ether_type).copied()
}

pub fn ip_protocol_name(protocol: u8) -> Option<&'static str> {
    IP_PROTOCOLS.get(&protocol).copied()
}

/// `0x0800 (IPv4)`, or just the hex value for unknown types.
pub(crate) fn ether_type_label(ether_type: u16) -> String {
    match ether_type_name(ether_type) {
        Some(name) => format!("0x{:04x} ({})", ether_type, name),
        None => format!("0x{:04x}", ether_type),
    }
}

/// `6 (TCP)`, or just the number for unassigned protocols.
pub(crate) fn ip_protocol_label(protocol: u8) -> String {
    match ip_protocol_name(protocol) {
        Some(name) => format!("{} ({})", protocol, name),
        None => protocol.to_string(),
    }
}
