use super::layer::{Dissection, Endpoints, Field};

const MIN_HEADER_LEN: usize = 20;

/// Represents parsed TCP flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpFlags {
    pub cwr: bool,
    pub ece: bool,
    pub urg: bool,
    pub ack: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub fin: bool,
}

impl TcpFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            cwr: byte & 0b1000_0000 != 0,
            ece: byte & 0b0100_0000 != 0,
            urg: byte & 0b0010_0000 != 0,
            ack: byte & 0b0001_0000 != 0,
            psh: byte & 0b0000_1000 != 0,
            rst: byte & 0b0000_0100 != 0,
            syn: byte & 0b0000_0010 != 0,
            fin: byte & 0b0000_0001 != 0,
        }
    }
}

impl std::fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut flags = vec![];
        if self.cwr {
            flags.push("CWR");
        }
        if self.ece {
            flags.push("ECE");
        }
        if self.urg {
            flags.push("URG");
        }
        if self.ack {
            flags.push("ACK");
        }
        if self.psh {
            flags.push("PSH");
        }
        if self.rst {
            flags.push("RST");
        }
        if self.syn {
            flags.push("SYN");
        }
        if self.fin {
            flags.push("FIN");
        }

        write!(f, "{}", flags.join("|"))
    }
}

/// Dissects a TCP header, options included.
///
/// The segment payload is left to the walker, which reports it as `Raw`.
pub(crate) fn dissect(header: &[u8]) -> Option<Dissection> {
    if header.len() < MIN_HEADER_LEN {
        return None;
    }

    let src_port = u16::from_be_bytes([header[0], header[1]]);
    let dst_port = u16::from_be_bytes([header[2], header[3]]);
    let seq = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let ack = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    let data_offset = header[12] >> 4;
    let header_len = data_offset as usize * 4;

    if header_len < MIN_HEADER_LEN || header.len() < header_len {
        return None;
    }

    let flags = TcpFlags::from_byte(header[13]); // TCP flags are at byte offset 13
    let window = u16::from_be_bytes([header[14], header[15]]);
    let checksum = u16::from_be_bytes([header[16], header[17]]);
    let urgent = u16::from_be_bytes([header[18], header[19]]);

    let mut fields = vec![
        Field::new("sport", src_port),
        Field::new("dport", dst_port),
        Field::new("seq", seq),
        Field::new("ack", ack),
        Field::new("dataofs", data_offset),
        Field::new("reserved", (header[12] >> 1) & 0x7),
        Field::new("flags", flags),
        Field::new("window", window),
        Field::new("chksum", format!("0x{:04x}", checksum)),
        Field::new("urgptr", urgent),
    ];
    if header_len > MIN_HEADER_LEN {
        fields.push(Field::new(
            "options",
            format!("{} bytes", header_len - MIN_HEADER_LEN),
        ));
    }

    Some(
        Dissection::new(fields, header_len).endpoints(Endpoints::Transport {
            src: src_port,
            dst: dst_port,
        }),
    )
}
