/// A file field pulled out of a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// `filename="..."` as sent by the browser; empty when nothing was picked.
    pub filename: String,
    pub data: Vec<u8>,
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
}

/// Finds the file part whose `name="<field_name>"` matches.
pub fn extract_file(body: &[u8], boundary: &str, field_name: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";

    for part in split_on(body, delimiter.as_bytes()) {
        let sep_pos = match find_subsequence(part, sep) {
            Some(p) => p,
            None => continue,
        };
        let headers = String::from_utf8_lossy(&part[..sep_pos]);
        if disposition_param(&headers, "name").as_deref() != Some(field_name) {
            continue;
        }
        let filename = match disposition_param(&headers, "filename") {
            Some(f) => f,
            None => continue,
        };
        let raw = &part[sep_pos + sep.len()..];
        let data = raw.strip_suffix(b"\r\n").unwrap_or(raw).to_vec();
        return Some(FilePart { filename, data });
    }
    None
}

/// Reads `key="value"` out of a Content-Disposition header block. The match
/// is anchored on a preceding `;` or space so `name` does not hit `filename`.
fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let pattern = format!("{}=\"", key);
    let mut from = 0;
    while let Some(pos) = headers[from..].find(&pattern) {
        let abs = from + pos;
        let anchored = abs == 0 || matches!(headers.as_bytes()[abs - 1], b' ' | b';');
        if anchored {
            let rest = &headers[abs + pattern.len()..];
            let end = rest.find('"')?;
            return Some(rest[..end].to_owned());
        }
        from = abs + pattern.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(boundary: &str, filename: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        out.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n");
        out.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        out.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n", filename).as_bytes(),
        );
        out.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        out.extend_from_slice(data);
        out.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        out
    }

    #[test]
    fn boundary_from_content_type() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=----abc").as_deref(),
            Some("----abc")
        );
        assert_eq!(extract_boundary("multipart/form-data; boundary=\"q\"").as_deref(), Some("q"));
        assert_eq!(extract_boundary("text/plain"), None);
    }

    #[test]
    fn pulls_the_named_file_with_binary_content() {
        let data = [0u8, 1, 2, b'\r', b'\n', 255];
        let part = extract_file(&body("XyZ", "cat.png", &data), "XyZ", "image").unwrap();
        assert_eq!(part.filename, "cat.png");
        assert_eq!(part.data, data);
    }

    #[test]
    fn empty_file_input_yields_empty_part() {
        let part = extract_file(&body("b", "", b""), "b", "image").unwrap();
        assert_eq!(part.filename, "");
        assert!(part.data.is_empty());
    }

    #[test]
    fn text_fields_and_unknown_names_are_skipped() {
        let b = body("b", "dog.jpg", b"xx");
        assert!(extract_file(&b, "b", "note").is_none());
        assert!(extract_file(&b, "b", "missing").is_none());
    }
}
