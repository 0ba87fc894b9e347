const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut into = String::with_capacity(bytes.len() * 2);

    for b in bytes {
        into.push(HEX_LOWER[(b >> 4) as usize] as char);
        into.push(HEX_LOWER[(b & 0xF) as usize] as char);
    }
    into
}

fn decode_nibble(nibble: u8) -> Option<u8> {
    match nibble {
        b'0'..=b'9' => Some(nibble - b'0'),
        b'a'..=b'f' => Some(nibble - b'a' + 10),
        b'A'..=b'F' => Some(nibble - b'A' + 10),
        _ => None,
    }
}

/// Decode a hex string into bytes.
///
/// An optional `0x` prefix is accepted, and so are the separators commonly
/// found in BLE sniffer output (spaces, `:` and `-`), so `02 16 f3 ff` and
/// `02:16:F3:FF` both decode to the same four bytes.
pub fn bytes_from_hex(ashex: &str) -> crate::Result<Vec<u8>> {
    let trimmed = ashex.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let digits: Vec<u8> = stripped
        .bytes()
        .filter(|b| !matches!(b, b' ' | b':' | b'-' | b'\t'))
        .collect();

    if digits.len() % 2 != 0 {
        return Err(crate::Error::InvalidHex(format!(
            "odd number of digits in `{}`",
            ashex
        )));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let high = decode_nibble(pair[0]);
            let low = decode_nibble(pair[1]);
            match (high, low) {
                (Some(h), Some(l)) => Ok((h << 4) | l),
                _ => Err(crate::Error::InvalidHex(format!(
                    "bad digit in `{}`",
                    ashex
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bytes_to_hex() {
        let bytes = &[0x00, 0x7F, 0x80, 0xFF];

        let as_hex = bytes_to_hex(bytes);
        assert_eq!(as_hex.as_str(), "007f80ff");
    }

    #[test]
    fn test_bytes_from_hex() {
        assert!(bytes_from_hex("hello world").is_err());
        assert!(bytes_from_hex("abc").is_err());
        let expected: Vec<u8> = vec![0x03, 0x16, 0xF3, 0xFF];
        assert_eq!(bytes_from_hex("0x0316f3ff").unwrap(), expected);
        assert_eq!(bytes_from_hex("0X0316F3FF").unwrap(), expected);
        assert_eq!(bytes_from_hex("03 16 f3 ff").unwrap(), expected);
        assert_eq!(bytes_from_hex("03:16:F3:ff").unwrap(), expected);
        assert_eq!(bytes_from_hex("").unwrap(), Vec::<u8>::new());
    }
}
