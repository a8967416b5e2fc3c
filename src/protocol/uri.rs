//! Percent encoding and request-target parsing.

use std::collections::HashMap;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Splits a request target into a percent-decoded path and its query
/// parameters. Parameters parsed from the query are inserted into `parameters`
/// with the `&`/`=` rule of [`parse_parameters`].
pub fn parse_target(target: &str, parameters: &mut HashMap<String, String>) -> String {
    match target.split_once('?') {
        Some((path, query)) => {
            parse_parameters(query, parameters);
            decode_lossy(path)
        }
        None => decode_lossy(target),
    }
}

/// Parses `&`-separated `name=value` pairs into `parameters`.
///
/// A pair without `=` yields an empty value. Values are percent-decoded,
/// names are not. On key collision the later occurrence wins.
pub fn parse_parameters(src: &str, parameters: &mut HashMap<String, String>) {
    for pair in src.split('&') {
        match pair.split_once('=') {
            Some((name, value)) => parameters.insert(name.to_owned(), decode_lossy(value)),
            None => parameters.insert(pair.to_owned(), String::new()),
        };
    }
}

/// Decodes `%XY` triplets into raw bytes, with no UTF-8 validation.
///
/// A trailing incomplete escape is truncated silently. `+` is passed through
/// unchanged.
pub fn percent_decode(src: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(src.len());
    let mut bytes = src.bytes();

    while let Some(b) = bytes.next() {
        if b != b'%' {
            result.push(b);
            continue;
        }
        let Some(hi) = bytes.next() else { break };
        let Some(lo) = bytes.next() else { break };
        // strtol-style leniency: a non-hex digit ends the number
        let value = match (hex_value(hi), hex_value(lo)) {
            (Some(hi), Some(lo)) => (hi << 4) | lo,
            (Some(hi), None) => hi,
            _ => 0,
        };
        result.push(value);
    }
    result
}

/// Percent-encodes every byte outside the unreserved set (and `/`) as `%XX`.
pub fn percent_encode(src: &[u8]) -> String {
    let mut result = String::with_capacity(src.len());
    for &b in src {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                result.push(b as char);
            }
            _ => {
                result.push('%');
                result.push(HEX_DIGITS[usize::from(b >> 4)] as char);
                result.push(HEX_DIGITS[usize::from(b & 0x0f)] as char);
            }
        }
    }
    result
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn decode_lossy(src: &str) -> String {
    String::from_utf8_lossy(&percent_decode(src)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_round_trip_printable_ascii() {
        let src = "some text with spaces, /slashes/ and \"quotes\"!";
        let encoded = percent_encode(src.as_bytes());
        assert_eq!(percent_decode(&encoded), src.as_bytes());
    }

    #[test]
    fn percent_round_trip_all_bytes() {
        let all: Vec<u8> = (0..=255).collect();
        let encoded = percent_encode(&all);
        assert_eq!(percent_decode(&encoded), all);
    }

    #[test]
    fn decodes_upper_and_lower_hex() {
        assert_eq!(percent_decode("%2F"), b"/");
        assert_eq!(percent_decode("%2f"), b"/");
        assert_eq!(percent_decode("%C3%A9"), [0xc3, 0xa9]);
    }

    #[test]
    fn truncates_trailing_incomplete_escape() {
        assert_eq!(percent_decode("abc%"), b"abc");
        assert_eq!(percent_decode("abc%4"), b"abc");
    }

    #[test]
    fn plus_is_not_a_space() {
        assert_eq!(percent_decode("a+b"), b"a+b");
    }

    #[test]
    fn parses_target_with_query() {
        let mut parameters = HashMap::new();
        let path = parse_target("/p?a=1&b=two&c", &mut parameters);

        assert_eq!(path, "/p");
        assert_eq!(parameters.len(), 3);
        assert_eq!(parameters["a"], "1");
        assert_eq!(parameters["b"], "two");
        assert_eq!(parameters["c"], "");
    }

    #[test]
    fn parses_target_without_query() {
        let mut parameters = HashMap::new();
        let path = parse_target("/a%20b", &mut parameters);

        assert_eq!(path, "/a b");
        assert!(parameters.is_empty());
    }

    #[test]
    fn later_parameter_occurrence_wins() {
        let mut parameters = HashMap::new();
        parse_parameters("a=1&a=2", &mut parameters);
        assert_eq!(parameters["a"], "2");
    }

    #[test]
    fn parameter_values_are_decoded_names_are_not() {
        let mut parameters = HashMap::new();
        parse_parameters("na%41me=v%41lue", &mut parameters);
        assert_eq!(parameters["na%41me"], "vAlue");
    }
}
