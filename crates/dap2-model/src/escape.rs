//! DAP identifier escaping.
//!
//! DAP2 identifiers travel with `%XX` hex escapes for characters outside
//! the identifier alphabet. Group-qualified names use `/` separators.

/// Characters that may appear unescaped in a DAP identifier.
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '!' | '~' | '*' | '\'' | '-' | '/')
}

/// Decode `%XX` escapes. Malformed escapes are kept verbatim.
pub fn unescape_identifier(encoded: &str) -> String {
    if !encoded.contains('%') {
        return encoded.to_string();
    }

    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Encode characters outside the identifier alphabet as `%XX`.
pub fn escape_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_identifier_char(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

/// Unescaped name with any group prefix (up to the last `/`) removed.
pub fn short_name(encoded: &str) -> String {
    let unescaped = unescape_identifier(encoded);
    match unescaped.rfind('/') {
        Some(index) => unescaped[index + 1..].to_string(),
        None => unescaped,
    }
}
