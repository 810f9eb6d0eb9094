use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Renders bytes as offset / hex / ASCII lines, 16 bytes per line.
///
/// ```text
/// 0000  45 00 00 3C 1C 46 40 00  40 06 B1 E6 0A 00 00 01  E..<.F@.@.......
/// ```
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(BYTES_PER_LINE) * 74);

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        if line > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04x}  ", line * BYTES_PER_LINE);

        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{:02X} ", byte);
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        for &byte in chunk {
            out.push(if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_short_line() {
        let dump = hexdump(b"AB\x00");
        assert_eq!(
            dump,
            "0000  41 42 00                                          AB."
        );
    }

    #[test]
    fn test_line_count_and_offsets() {
        let data: Vec<u8> = (0u8..40).collect();
        let dump = hexdump(&data);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0010  10 11"));
        assert!(lines[2].starts_with("0020  20 21"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(hexdump(&[]), "");
    }
}
