//! Request envelope parsing.

use std::borrow::Cow;
use std::str;

use crate::connection::ConnectionError;

use super::attributes::Attributes;
use super::{ENVELOPE, MSG_INFO, PSD_CORE, PSD_FIELDS, PSD_XHDR, REQUEST};

/// One decoded MSAC request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsacRequest {
    msg_type: String,
    info: Attributes,
    psd: Option<PsdFields>,
}

/// Nested PSD elements of a request, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsdFields {
    /// Attributes of `PSD-Fields/core`.
    pub core: Option<Attributes>,
    /// Attributes of `PSD-Fields/xhdr`.
    pub xhdr: Option<Attributes>,
}

impl MsacRequest {
    /// Parses one complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Protocol`] when the frame is not UTF-8, is
    /// not well formed, or lacks `HDRadio-Envelope/MSAC-Request/Msg-Info` with
    /// a `msgType` attribute.
    pub fn decode(frame: &[u8]) -> Result<Self, ConnectionError> {
        let text = str::from_utf8(frame).map_err(|error| {
            ConnectionError::protocol(format!("envelope is not valid UTF-8: {error}"))
        })?;
        // Whitespace left over from the previous frame may precede the mark.
        let text = text.trim_start();
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        DocumentWalk::default().run(text)
    }

    /// The `msgType` attribute of `Msg-Info`.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// All attributes of `Msg-Info`.
    #[must_use]
    pub fn info(&self) -> &Attributes {
        &self.info
    }

    /// The `PSD-Fields` element, if the request carried one.
    #[must_use]
    pub fn psd(&self) -> Option<&PsdFields> {
        self.psd.as_ref()
    }
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Tracks the element path while scanning and keeps the attributes the
/// dispatcher cares about. The first occurrence of each element wins.
#[derive(Default)]
struct DocumentWalk<'a> {
    path: Vec<&'a str>,
    root_seen: bool,
    request_seen: bool,
    info: Option<Attributes>,
    psd: Option<PsdFields>,
}

impl<'a> DocumentWalk<'a> {
    fn run(mut self, text: &'a str) -> Result<MsacRequest, ConnectionError> {
        let mut scanner = Scanner::new(text);
        while let Some(token) = scanner.next_token()? {
            match token {
                Token::Start {
                    name,
                    attributes,
                    empty,
                } => {
                    self.open(name, attributes)?;
                    if empty {
                        self.path.pop();
                    }
                }
                Token::End { name } => self.close(name)?,
                Token::Text(text) => {
                    if self.path.is_empty() && !text.trim().is_empty() {
                        return Err(ConnectionError::protocol(
                            "text content outside the root element",
                        ));
                    }
                }
            }
        }
        self.finish()
    }

    fn open(&mut self, name: &'a str, attributes: Attributes) -> Result<(), ConnectionError> {
        if self.path.is_empty() {
            if self.root_seen {
                return Err(ConnectionError::protocol("more than one root element"));
            }
            if name != ENVELOPE {
                return Err(ConnectionError::protocol(format!(
                    "expected <{ENVELOPE}> root, found <{name}>"
                )));
            }
            self.root_seen = true;
        }
        self.path.push(name);
        match self.path.as_slice() {
            [ENVELOPE, REQUEST] => self.request_seen = true,
            [ENVELOPE, REQUEST, MSG_INFO] if self.info.is_none() => self.info = Some(attributes),
            [ENVELOPE, REQUEST, PSD_FIELDS] => {
                self.psd.get_or_insert_with(PsdFields::default);
            }
            [ENVELOPE, REQUEST, PSD_FIELDS, PSD_CORE] => {
                let psd = self.psd.get_or_insert_with(PsdFields::default);
                if psd.core.is_none() {
                    psd.core = Some(attributes);
                }
            }
            [ENVELOPE, REQUEST, PSD_FIELDS, PSD_XHDR] => {
                let psd = self.psd.get_or_insert_with(PsdFields::default);
                if psd.xhdr.is_none() {
                    psd.xhdr = Some(attributes);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), ConnectionError> {
        match self.path.pop() {
            Some(open) if open == name => Ok(()),
            Some(open) => Err(ConnectionError::protocol(format!(
                "</{name}> does not close <{open}>"
            ))),
            None => Err(ConnectionError::protocol(format!(
                "</{name}> has no matching start tag"
            ))),
        }
    }

    fn finish(self) -> Result<MsacRequest, ConnectionError> {
        if !self.root_seen {
            return Err(ConnectionError::protocol("envelope contains no elements"));
        }
        if let Some(open) = self.path.last() {
            return Err(ConnectionError::protocol(format!("<{open}> is never closed")));
        }
        if !self.request_seen {
            return Err(ConnectionError::missing_element(ENVELOPE, REQUEST));
        }
        let info = self
            .info
            .ok_or_else(|| ConnectionError::missing_element(REQUEST, MSG_INFO))?;
        let msg_type = info.require(MSG_INFO, "msgType")?.to_string();
        Ok(MsacRequest {
            msg_type,
            info,
            psd: self.psd,
        })
    }
}

enum Token<'a> {
    Start {
        name: &'a str,
        attributes: Attributes,
        empty: bool,
    },
    End {
        name: &'a str,
    },
    Text(&'a str),
}

/// Pull scanner over the document text. All delimiters it looks for are
/// ASCII, so every slice boundary falls on a character boundary.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ConnectionError> {
        let input = self.input;
        loop {
            let rest = &input[self.pos..];
            if rest.is_empty() {
                return Ok(None);
            }
            if !rest.starts_with('<') {
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                return Ok(Some(Token::Text(&rest[..end])));
            }
            if rest.starts_with("<?") {
                self.skip_past("?>", "processing instruction")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->", "comment")?;
            } else if let Some(body) = rest.strip_prefix("<![CDATA[") {
                let end = body
                    .find("]]>")
                    .ok_or_else(|| ConnectionError::protocol("unterminated CDATA section"))?;
                self.pos += "<![CDATA[".len() + end + "]]>".len();
                return Ok(Some(Token::Text(&body[..end])));
            } else if rest.starts_with("<!") {
                self.skip_past(">", "declaration")?;
            } else if rest.starts_with("</") {
                return self.end_tag().map(Some);
            } else {
                return self.start_tag().map(Some);
            }
        }
    }

    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<(), ConnectionError> {
        let rest = &self.input[self.pos..];
        let end = rest
            .find(terminator)
            .ok_or_else(|| ConnectionError::protocol(format!("unterminated {what}")))?;
        self.pos += end + terminator.len();
        Ok(())
    }

    fn end_tag(&mut self) -> Result<Token<'a>, ConnectionError> {
        let mut cursor = self.pos + 2;
        let name = take_name(self.input, &mut cursor)?;
        skip_whitespace(self.input, &mut cursor);
        if !self.input[cursor..].starts_with('>') {
            return Err(ConnectionError::protocol(format!(
                "malformed closing tag </{name}"
            )));
        }
        self.pos = cursor + 1;
        Ok(Token::End { name })
    }

    fn start_tag(&mut self) -> Result<Token<'a>, ConnectionError> {
        let input = self.input;
        let mut cursor = self.pos + 1;
        let name = take_name(input, &mut cursor)?;
        let mut attributes = Attributes::default();
        loop {
            let separated = skip_whitespace(input, &mut cursor);
            let rest = &input[cursor..];
            if rest.starts_with("/>") {
                self.pos = cursor + 2;
                return Ok(Token::Start {
                    name,
                    attributes,
                    empty: true,
                });
            }
            if rest.starts_with('>') {
                self.pos = cursor + 1;
                return Ok(Token::Start {
                    name,
                    attributes,
                    empty: false,
                });
            }
            if rest.is_empty() {
                return Err(ConnectionError::protocol(format!(
                    "unterminated start tag <{name}"
                )));
            }
            if !separated {
                return Err(ConnectionError::protocol(format!(
                    "expected whitespace before attribute in <{name}>"
                )));
            }
            let (attribute, value) = take_attribute(input, &mut cursor, name)?;
            if attributes.get(attribute).is_some() {
                return Err(ConnectionError::protocol(format!(
                    "duplicate attribute '{attribute}' in <{name}>"
                )));
            }
            attributes.insert(attribute, value);
        }
    }
}

fn take_attribute<'a>(
    input: &'a str,
    cursor: &mut usize,
    element: &str,
) -> Result<(&'a str, String), ConnectionError> {
    let name = take_name(input, cursor)?;
    skip_whitespace(input, cursor);
    if !input[*cursor..].starts_with('=') {
        return Err(ConnectionError::protocol(format!(
            "attribute '{name}' in <{element}> has no value"
        )));
    }
    *cursor += 1;
    skip_whitespace(input, cursor);
    let rest = &input[*cursor..];
    let quote = match rest.as_bytes().first() {
        Some(b'"') => '"',
        Some(b'\'') => '\'',
        _ => {
            return Err(ConnectionError::protocol(format!(
                "attribute '{name}' in <{element}> is not quoted"
            )));
        }
    };
    let body = &rest[1..];
    let end = body.find(quote).ok_or_else(|| {
        ConnectionError::protocol(format!("unterminated value for attribute '{name}'"))
    })?;
    let raw = &body[..end];
    if raw.contains('<') {
        return Err(ConnectionError::protocol(format!(
            "attribute '{name}' contains a raw '<'"
        )));
    }
    *cursor += 1 + end + 1;
    Ok((name, unescape(raw)?.into_owned()))
}

fn take_name<'a>(input: &'a str, cursor: &mut usize) -> Result<&'a str, ConnectionError> {
    let rest = &input[*cursor..];
    let length = rest
        .bytes()
        .take_while(|byte| {
            !byte.is_ascii_whitespace() && !matches!(byte, b'/' | b'>' | b'<' | b'=' | b'"' | b'\'')
        })
        .count();
    if length == 0 {
        return Err(ConnectionError::protocol(format!(
            "expected a name at byte {cursor}"
        )));
    }
    *cursor += length;
    Ok(&rest[..length])
}

fn skip_whitespace(input: &str, cursor: &mut usize) -> bool {
    let skipped = input[*cursor..]
        .bytes()
        .take_while(u8::is_ascii_whitespace)
        .count();
    *cursor += skipped;
    skipped > 0
}

fn unescape(raw: &str) -> Result<Cow<'_, str>, ConnectionError> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| ConnectionError::protocol("unterminated entity reference"))?;
        decoded.push(resolve_entity(&after[..semi])?);
        rest = &after[semi + 1..];
    }
    decoded.push_str(rest);
    Ok(Cow::Owned(decoded))
}

fn resolve_entity(entity: &str) -> Result<char, ConnectionError> {
    let resolved = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    };
    resolved.ok_or_else(|| ConnectionError::protocol(format!("unknown entity '&{entity};'")))
}
