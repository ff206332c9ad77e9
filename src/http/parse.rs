use crate::http::request::{HttpRequest, Method};
use std::io::{self, ErrorKind};
use std::str;

const MAX_REQUEST_LINE: usize = 8192;
const MAX_HEADER_BYTES: usize = 65536;

#[derive(Debug, Clone)]
enum ParseState {
    RequestLine,
    Headers,
    Body,
    Complete,
}

/// Incremental HTTP/1.1 request parser. Data read off the socket is fed in
/// as it arrives; a complete request is returned once the Content-Length
/// body (if any) has been consumed.
#[derive(Debug)]
pub struct HttpParser {
    state: ParseState,
    buffer: Vec<u8>,
    request: HttpRequest,
    body_bytes_read: usize,
    expected_body_length: Option<usize>,
}

impl HttpParser {
    pub fn new() -> Self {
        HttpParser {
            state: ParseState::RequestLine,
            buffer: Vec::new(),
            request: HttpRequest::new(),
            body_bytes_read: 0,
            expected_body_length: None,
        }
    }

    /// Parse incoming data incrementally. Returns Ok(Some(request)) when
    /// complete, Ok(None) when more data is needed, or Err for parse errors.
    pub fn parse(&mut self, data: &[u8]) -> io::Result<Option<HttpRequest>> {
        self.buffer.extend_from_slice(data);

        loop {
            match self.state {
                ParseState::RequestLine => {
                    if let Some(request) = self.parse_request_line()? {
                        self.request = request;
                        self.state = ParseState::Headers;
                    } else {
                        return Ok(None);
                    }
                }
                ParseState::Headers => {
                    if self.parse_headers()? {
                        self.expected_body_length = self.request.content_length();
                        if self.expected_body_length.is_some() {
                            self.state = ParseState::Body;
                        } else {
                            self.state = ParseState::Complete;
                        }
                    } else {
                        return Ok(None);
                    }
                }
                ParseState::Body => {
                    if self.parse_body() {
                        self.state = ParseState::Complete;
                    } else {
                        return Ok(None);
                    }
                }
                ParseState::Complete => {
                    return Ok(Some(self.request.clone()));
                }
            }
        }
    }

    fn parse_request_line(&mut self) -> io::Result<Option<HttpRequest>> {
        if let Some(pos) = self.find_crlf() {
            let line_bytes = self.buffer.drain(..pos + 2).collect::<Vec<u8>>();
            let line = str::from_utf8(&line_bytes[..pos])
                .map_err(|_| io::Error::new(ErrorKind::InvalidData, "Invalid UTF-8 in request line"))?;

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 {
                return Err(io::Error::new(ErrorKind::InvalidData, "Invalid request line format"));
            }

            let method = Method::from_str(parts[0])
                .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "Unsupported HTTP method"))?;

            let (path, query_string) = match parts[1].find('?') {
                Some(query_pos) => (
                    parts[1][..query_pos].to_string(),
                    Some(parts[1][query_pos + 1..].to_string()),
                ),
                None => (parts[1].to_string(), None),
            };

            let version = parts[2].to_string();
            if !version.starts_with("HTTP/") {
                return Err(io::Error::new(ErrorKind::InvalidData, "Invalid HTTP version"));
            }

            let mut request = HttpRequest::new();
            request.method = method;
            request.path = path;
            request.version = version;
            request.query_string = query_string;

            Ok(Some(request))
        } else {
            if self.buffer.len() > MAX_REQUEST_LINE {
                return Err(io::Error::new(ErrorKind::InvalidData, "Request line too long"));
            }
            Ok(None)
        }
    }

    fn parse_headers(&mut self) -> io::Result<bool> {
        loop {
            if let Some(pos) = self.find_crlf() {
                if pos == 0 {
                    // Empty line indicates end of headers
                    self.buffer.drain(..2);
                    return Ok(true);
                }

                let line_bytes = self.buffer.drain(..pos + 2).collect::<Vec<u8>>();
                let line = str::from_utf8(&line_bytes[..pos])
                    .map_err(|_| io::Error::new(ErrorKind::InvalidData, "Invalid UTF-8 in header"))?;

                let colon_pos = line
                    .find(':')
                    .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "Invalid header format"))?;

                let name = line[..colon_pos].trim().to_string();
                let value = line[colon_pos + 1..].trim().to_string();
                if name.is_empty() {
                    return Err(io::Error::new(ErrorKind::InvalidData, "Empty header name"));
                }

                self.request.headers.insert(name, value);
            } else {
                if self.buffer.len() > MAX_HEADER_BYTES {
                    return Err(io::Error::new(ErrorKind::InvalidData, "Headers too large"));
                }
                return Ok(false);
            }
        }
    }

    fn parse_body(&mut self) -> bool {
        let expected_length = match self.expected_body_length {
            Some(length) => length,
            None => return true,
        };

        let needed = expected_length - self.body_bytes_read;
        let take = needed.min(self.buffer.len());
        let body_data = self.buffer.drain(..take).collect::<Vec<u8>>();
        self.request.body.extend_from_slice(&body_data);
        self.body_bytes_read += take;

        self.body_bytes_read == expected_length
    }

    fn find_crlf(&self) -> Option<usize> {
        self.buffer.windows(2).position(|window| window == b"\r\n")
    }
}
