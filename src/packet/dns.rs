use super::layer::{Dissection, Field};

const HEADER_LEN: usize = 12;

/// Dissects the DNS header and question names.
///
/// Resource records are not decoded; the layer spans the whole message so
/// they show up in its hex dump.
pub(crate) fn dissect(payload: &[u8]) -> Option<Dissection> {
    if payload.len() < HEADER_LEN {
        return None;
    }

    let id = u16::from_be_bytes([payload[0], payload[1]]);
    let flags = u16::from_be_bytes([payload[2], payload[3]]);
    let qdcount = u16::from_be_bytes([payload[4], payload[5]]);
    let ancount = u16::from_be_bytes([payload[6], payload[7]]);
    let nscount = u16::from_be_bytes([payload[8], payload[9]]);
    let arcount = u16::from_be_bytes([payload[10], payload[11]]);

    // a message whose questions don't parse isn't DNS
    let queries = parse_dns_queries(payload).ok()?;

    let mut fields = vec![
        Field::new("id", id),
        Field::new("qr", (flags >> 15) & 0x1),
        Field::new("opcode", opcode_label((flags >> 11) & 0xF)),
        Field::new("aa", (flags >> 10) & 0x1),
        Field::new("tc", (flags >> 9) & 0x1),
        Field::new("rd", (flags >> 8) & 0x1),
        Field::new("ra", (flags >> 7) & 0x1),
        Field::new("rcode", rcode_label(flags & 0xF)),
        Field::new("qdcount", qdcount),
        Field::new("ancount", ancount),
        Field::new("nscount", nscount),
        Field::new("arcount", arcount),
    ];
    if !queries.is_empty() {
        fields.push(Field::new("qd", queries.join(", ")));
    }

    Some(Dissection::new(fields, payload.len()))
}

fn opcode_label(opcode: u16) -> String {
    match opcode {
        0 => "0 (QUERY)".to_string(),
        1 => "1 (IQUERY)".to_string(),
        2 => "2 (STATUS)".to_string(),
        4 => "4 (NOTIFY)".to_string(),
        5 => "5 (UPDATE)".to_string(),
        other => other.to_string(),
    }
}

fn rcode_label(rcode: u16) -> String {
    match rcode {
        0 => "0 (ok)".to_string(),
        1 => "1 (format-error)".to_string(),
        2 => "2 (server-failure)".to_string(),
        3 => "3 (name-error)".to_string(),
        4 => "4 (not-implemented)".to_string(),
        5 => "5 (refused)".to_string(),
        other => other.to_string(),
    }
}

/// Parses the DNS queries from a DNS payload (after the 12-byte DNS header).
/// Returns a vector of query domain names or an error string.
pub(crate) fn parse_dns_queries(payload: &[u8]) -> Result<Vec<String>, &'static str> {
    if payload.len() < HEADER_LEN {
        return Err("DNS payload too short");
    }

    let qdcount = u16::from_be_bytes([payload[4], payload[5]]);
    if qdcount == 0 {
        return Ok(vec![]);
    }

    let mut queries = Vec::new();
    let mut offset = HEADER_LEN;

    for _ in 0..qdcount {
        let (name, next_offset) = parse_dns_name(payload, offset, 0)?;
        queries.push(if name.is_empty() { ".".to_string() } else { name });

        // Skip QTYPE(2 bytes) + QCLASS(2 bytes)
        offset = next_offset + 4;
        if offset > payload.len() {
            break;
        }
    }

    Ok(queries)
} // parse_dns_queries

/// Parses a DNS name from the payload starting at the given offset.
/// Supports compression pointers.
///
/// `depth` tracks recursion depth to avoid infinite loops.
///
/// Returns the parsed name and the next offset after the name.
fn parse_dns_name(payload: &[u8], offset: usize, depth: usize) -> Result<(String, usize), &'static str> {
    if depth > 10 {
        return Err("Too many compression pointer indirections");
    }

    let mut labels = Vec::new();
    let mut pos = offset;

    loop {
        if pos >= payload.len() {
            return Err("Offset out of bounds during DNS name parsing");
        }

        let len = payload[pos];
        pos += 1;

        if len == 0 {
            // End of the name, return position after the zero-length label
            return Ok((labels.join("."), pos));
        }

        if (len & 0xC0) == 0xC0 {
            // Compression pointer detected
            if pos >= payload.len() {
                return Err("Incomplete compression pointer");
            }
            let b2 = payload[pos];
            pos += 1;

            // Calculate the pointer offset (14 bits)
            let pointer_offset = (((len & 0x3F) as usize) << 8) | (b2 as usize);

            if pointer_offset >= payload.len() {
                return Err("Compression pointer offset out of bounds");
            }

            let (ptr_name, _) = parse_dns_name(payload, pointer_offset, depth + 1)?;
            labels.push(ptr_name);

            // Return position after the pointer bytes
            return Ok((labels.join("."), pos));
        } else {
            if pos + (len as usize) > payload.len() {
                return Err("Label length exceeds payload");
            }

            let label_bytes = &payload[pos..pos + (len as usize)];
            // labels are octets; don't let one odd byte lose the whole message
            labels.push(String::from_utf8_lossy(label_bytes).into_owned());
            pos += len as usize;
        }
    }
} // parse_dns_name

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::dns_query;

    #[test]
    fn test_query_header() {
        let dissection = dissect(&dns_query()).unwrap();
        let value = |name: &str| {
            dissection
                .fields
                .iter()
                .find(|field| field.name == name)
                .map(|field| field.value.clone())
        };
        assert_eq!(value("id").as_deref(), Some("43981"));
        assert_eq!(value("qr").as_deref(), Some("0"));
        assert_eq!(value("rd").as_deref(), Some("1"));
        assert_eq!(value("opcode").as_deref(), Some("0 (QUERY)"));
        assert_eq!(value("qd").as_deref(), Some("example.com"));
        assert_eq!(dissection.header_len, dns_query().len());
    }

    #[test]
    fn test_compressed_name() {
        let mut msg = vec![0, 1, 0x81, 0x80, 0, 2, 0, 0, 0, 0, 0, 0];
        msg.extend_from_slice(b"\x03www\x07example\x03com\x00\x00\x01\x00\x01");
        // second question points at "example.com" (offset 16)
        msg.extend_from_slice(&[0x03, b'f', b't', b'p', 0xC0, 16, 0x00, 0x01, 0x00, 0x01]);
        let queries = parse_dns_queries(&msg).unwrap();
        assert_eq!(queries, vec!["www.example.com", "ftp.example.com"]);
    }

    #[test]
    fn test_non_utf8_label_still_dissects() {
        let mut msg = vec![0, 7, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
        msg.extend_from_slice(b"\x04ca\xfee\x03com\x00\x00\x01\x00\x01");

        let queries = parse_dns_queries(&msg).unwrap();
        assert_eq!(queries, vec!["ca\u{fffd}e.com"]);

        let dissection = dissect(&msg).unwrap();
        let qd = dissection.fields.iter().find(|field| field.name == "qd").unwrap();
        assert_eq!(qd.value, "ca\u{fffd}e.com");
        assert_eq!(dissection.header_len, msg.len());
    }

    #[test]
    fn test_pointer_loop_rejected() {
        let mut msg = vec![0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
        msg.extend_from_slice(&[0xC0, 12]);
        assert!(parse_dns_queries(&msg).is_err());
        assert!(dissect(&msg).is_none());
    }
}
