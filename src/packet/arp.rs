use std::net::Ipv4Addr;

use super::ethernet::format_mac;
use super::layer::{Dissection, Field};
use super::names::ether_type_label;

const FIXED_LEN: usize = 8;

pub(crate) fn dissect(data: &[u8]) -> Option<Dissection> {
    if data.len() < FIXED_LEN {
        return None;
    }

    let hwtype = u16::from_be_bytes([data[0], data[1]]);
    let ptype = u16::from_be_bytes([data[2], data[3]]);
    let hwlen = data[4] as usize;
    let plen = data[5] as usize;
    let op = u16::from_be_bytes([data[6], data[7]]);

    let header_len = FIXED_LEN + 2 * (hwlen + plen);
    if data.len() < header_len {
        return None;
    }

    let (hwsrc, rest) = data[FIXED_LEN..header_len].split_at(hwlen);
    let (psrc, rest) = rest.split_at(plen);
    let (hwdst, pdst) = rest.split_at(hwlen);

    let op_label = match op {
        1 => "1 (who-has)".to_string(),
        2 => "2 (is-at)".to_string(),
        3 => "3 (RARP-req)".to_string(),
        4 => "4 (RARP-rep)".to_string(),
        other => other.to_string(),
    };

    Some(
        Dissection::new(
            vec![
                Field::new("hwtype", format!("0x{:04x}", hwtype)),
                Field::new("ptype", ether_type_label(ptype)),
                Field::new("hwlen", hwlen),
                Field::new("plen", plen),
                Field::new("op", op_label),
                Field::new("hwsrc", render_hw(hwsrc)),
                Field::new("psrc", render_proto(psrc)),
                Field::new("hwdst", render_hw(hwdst)),
                Field::new("pdst", render_proto(pdst)),
            ],
            header_len,
        )
        // anything after the addresses is Ethernet minimum-size padding
        .extent(header_len),
    )
}

fn render_hw(bytes: &[u8]) -> String {
    match <[u8; 6]>::try_from(bytes) {
        Ok(mac) => format_mac(&mac),
        Err(_) => render_hex(bytes),
    }
}

fn render_proto(bytes: &[u8]) -> String {
    match <[u8; 4]>::try_from(bytes) {
        Ok(octets) => Ipv4Addr::from(octets).to_string(),
        Err(_) => render_hex(bytes),
    }
}

fn render_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}
