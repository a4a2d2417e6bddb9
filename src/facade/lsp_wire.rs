//! Framing for the LSP stdio transport: `Content-Length` headers followed
//! by a JSON-RPC body, read off of any `BufRead`.

use std::io::BufRead;

use crate::{ret_error, Result};

const HEADER_CONTENT_LENGTH: &str = "content-length";
const HEADER_CONTENT_TYPE: &str = "content-type";

pub enum LspHeader {
    ContentType,
    ContentLength(usize),
}

fn parse_header(s: &str) -> Result<LspHeader> {
    let split: Vec<String> = s.splitn(2, ": ").map(|s| s.trim().to_lowercase()).collect();
    if split.len() != 2 {
        ret_error!("malformed LSP header: `{}`", s);
    }
    match split[0].as_ref() {
        HEADER_CONTENT_TYPE => Ok(LspHeader::ContentType),
        HEADER_CONTENT_LENGTH => Ok(LspHeader::ContentLength(split[1].parse()?)),
        other => ret_error!("unknown LSP header: `{}`", other),
    }
}

/// Blocking read of one framed LSP message body from `reader`.
pub fn read_message<T: BufRead>(reader: &mut T) -> Result<String> {
    let mut buffer = String::new();
    let mut content_length: Option<usize> = None;

    loop {
        buffer.clear();
        reader.read_line(&mut buffer)?;

        if buffer.trim().is_empty() {
            break;
        }
        match parse_header(&buffer)? {
            LspHeader::ContentLength(len) => content_length = Some(len),
            LspHeader::ContentType => (),
        }
    }

    let content_length = content_length.unwrap_or(0);
    let mut body_buffer = vec![0; content_length];
    reader.read_exact(&mut body_buffer)?;

    Ok(String::from_utf8(body_buffer)?)
}
