use std::collections::HashMap;
use std::io::{self, ErrorKind};

/// A single field in a `multipart/form-data` body. File parts carry the
/// client-submitted filename; plain form fields do not.
#[derive(Debug, Clone)]
pub struct MultipartField {
    pub name: String,
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Parser for `multipart/form-data` request bodies.
pub struct MultipartParser {
    boundary: String,
}

impl MultipartParser {
    pub fn new(boundary: String) -> Self {
        MultipartParser { boundary }
    }

    /// Parse a complete multipart body into its fields, in the order the
    /// parts appear. Malformed parts are skipped.
    pub fn parse(&self, data: &[u8]) -> io::Result<Vec<MultipartField>> {
        let delimiter = format!("--{}", self.boundary).into_bytes();
        let mut fields = Vec::new();

        // Skip the preamble up to and including the first delimiter line.
        let mut pos = match find_subsequence(data, &delimiter, 0) {
            Some(found) => found + delimiter.len(),
            None => {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "Invalid multipart data: missing initial boundary",
                ))
            }
        };

        // Part content runs until the CRLF preceding the next delimiter.
        let mut terminator = Vec::with_capacity(delimiter.len() + 2);
        terminator.extend_from_slice(b"\r\n");
        terminator.extend_from_slice(&delimiter);

        loop {
            // A delimiter followed by "--" closes the body.
            if data[pos..].starts_with(b"--") {
                break;
            }
            pos = skip_crlf(data, pos);

            let part_end = match find_subsequence(data, &terminator, pos) {
                Some(found) => found,
                None => break,
            };

            if let Ok(field) = self.parse_part(&data[pos..part_end]) {
                fields.push(field);
            }

            pos = part_end + terminator.len();
            if pos >= data.len() {
                break;
            }
        }

        Ok(fields)
    }

    /// Parse one part: headers up to the blank line, raw bytes after it.
    fn parse_part(&self, part: &[u8]) -> io::Result<MultipartField> {
        let header_end = find_subsequence(part, b"\r\n\r\n", 0).ok_or_else(|| {
            io::Error::new(ErrorKind::InvalidData, "Invalid multipart part: missing header end")
        })?;

        let headers = parse_part_headers(&part[..header_end])?;
        let body = part[header_end + 4..].to_vec();

        let content_disposition = headers.get("content-disposition").ok_or_else(|| {
            io::Error::new(ErrorKind::InvalidData, "Missing Content-Disposition header")
        })?;

        let (name, filename) = parse_content_disposition(content_disposition)?;

        Ok(MultipartField {
            name,
            filename,
            data: body,
        })
    }
}

/// Find `needle` in `haystack` starting from `start`.
fn find_subsequence(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    if start >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[start..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|found| start + found)
}

fn skip_crlf(data: &[u8], mut pos: usize) -> usize {
    if pos < data.len() && data[pos] == b'\r' {
        pos += 1;
    }
    if pos < data.len() && data[pos] == b'\n' {
        pos += 1;
    }
    pos
}

fn parse_part_headers(data: &[u8]) -> io::Result<HashMap<String, String>> {
    let headers_str = std::str::from_utf8(data)
        .map_err(|_| io::Error::new(ErrorKind::InvalidData, "Invalid UTF-8 in part headers"))?;

    let mut headers = HashMap::new();
    for line in headers_str.lines() {
        if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            headers.insert(name, value);
        }
    }
    Ok(headers)
}

/// Extract the field name and optional filename from a Content-Disposition
/// header value.
fn parse_content_disposition(header: &str) -> io::Result<(String, Option<String>)> {
    let mut name = None;
    let mut filename = None;

    for param in header.split(';') {
        let param = param.trim();
        if let Some(value) = param.strip_prefix("name=") {
            name = Some(unquote(value));
        } else if let Some(value) = param.strip_prefix("filename=") {
            filename = Some(unquote(value));
        }
    }

    let name = name.ok_or_else(|| {
        io::Error::new(ErrorKind::InvalidData, "Missing name in Content-Disposition")
    })?;

    Ok((name, filename))
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(b"--BOUNDARY\r\n");
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(b"--BOUNDARY--\r\n");
        body
    }

    #[test]
    fn test_parse_single_file_part() {
        let body = body_with(&[("file", Some("hello.txt"), b"hello world")]);
        let fields = MultipartParser::new("BOUNDARY".to_string()).parse(&body).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "file");
        assert_eq!(fields[0].filename.as_deref(), Some("hello.txt"));
        assert_eq!(fields[0].data, b"hello world");
    }

    #[test]
    fn test_parse_preserves_part_order() {
        let body = body_with(&[
            ("file", Some("a.txt"), b"A"),
            ("note", None, b"just text"),
            ("file[]", Some("b.txt"), b"B"),
        ]);
        let fields = MultipartParser::new("BOUNDARY".to_string()).parse(&body).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].filename.as_deref(), Some("a.txt"));
        assert!(fields[1].filename.is_none());
        assert_eq!(fields[2].name, "file[]");
        assert_eq!(fields[2].data, b"B");
    }

    #[test]
    fn test_parse_binary_content_intact() {
        // Contents containing CRLF pairs must not be truncated.
        let payload: &[u8] = b"line one\r\nline two\r\n\r\nline three";
        let body = body_with(&[("file", Some("multi.txt"), payload)]);
        let fields = MultipartParser::new("BOUNDARY".to_string()).parse(&body).unwrap();

        assert_eq!(fields[0].data, payload);
    }

    #[test]
    fn test_parse_missing_boundary_is_error() {
        let parser = MultipartParser::new("BOUNDARY".to_string());
        assert!(parser.parse(b"no boundary here").is_err());
    }

    #[test]
    fn test_parse_empty_body_has_no_fields() {
        let parser = MultipartParser::new("BOUNDARY".to_string());
        let fields = parser.parse(b"--BOUNDARY--\r\n").unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"file name.txt\""), "file name.txt");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("\"\""), "");
    }
}
