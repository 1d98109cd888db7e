//! Response envelope serialisation.

use super::{ENVELOPE, LOT_INFO, MSG_INFO, RESPONSE};

/// A response in the fixed `HDRadio-Envelope/MSAC-Response` shape.
///
/// Attributes are emitted in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    response: Vec<(&'static str, String)>,
    msg_type: String,
    info: Vec<(&'static str, String)>,
    lot_id: Option<u16>,
}

impl ResponseEnvelope {
    /// Starts a response whose `Msg-Info` echoes `msg_type`.
    pub fn new(msg_type: impl Into<String>) -> Self {
        Self {
            response: Vec::new(),
            msg_type: msg_type.into(),
            info: Vec::new(),
            lot_id: None,
        }
    }

    /// Adds an attribute to `MSAC-Response`.
    #[must_use]
    pub fn response_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.response.push((name, value.into()));
        self
    }

    /// Adds an attribute to `Msg-Info` after `msgType`.
    #[must_use]
    pub fn info_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.info.push((name, value.into()));
        self
    }

    /// Appends a `Lot-Info` element carrying `lot_id`.
    #[must_use]
    pub fn lot(mut self, lot_id: u16) -> Self {
        self.lot_id = Some(lot_id);
        self
    }

    /// Serialises the envelope as UTF-8.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(256);
        out.push('<');
        out.push_str(ENVELOPE);
        out.push_str("><");
        out.push_str(RESPONSE);
        push_attributes(&mut out, self.response.iter().map(|(k, v)| (*k, v.as_str())));
        out.push('>');

        out.push('<');
        out.push_str(MSG_INFO);
        push_attributes(
            &mut out,
            std::iter::once(("msgType", self.msg_type.as_str()))
                .chain(self.info.iter().map(|(k, v)| (*k, v.as_str()))),
        );
        out.push_str(" />");

        if let Some(lot_id) = self.lot_id {
            out.push('<');
            out.push_str(LOT_INFO);
            push_attributes(&mut out, std::iter::once(("lotId", lot_id.to_string().as_str())));
            out.push_str(" />");
        }

        out.push_str("</");
        out.push_str(RESPONSE);
        out.push_str("></");
        out.push_str(ENVELOPE);
        out.push('>');
        out.into_bytes()
    }
}

fn push_attributes<'a>(out: &mut String, attributes: impl Iterator<Item = (&'a str, &'a str)>) {
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_escaped(out, value);
        out.push('"');
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::find_delimiter;

    fn render(envelope: &ResponseEnvelope) -> String {
        String::from_utf8(envelope.to_bytes()).expect("utf8")
    }

    #[test]
    fn writes_minimal_confirmation() {
        let envelope =
            ResponseEnvelope::new("Direct File Copy").response_attribute("returnString", "OK");
        assert_eq!(
            render(&envelope),
            concat!(
                "<HDRadio-Envelope><MSAC-Response returnString=\"OK\">",
                "<Msg-Info msgType=\"Direct File Copy\" />",
                "</MSAC-Response></HDRadio-Envelope>",
            )
        );
    }

    #[test]
    fn writes_lot_info_and_ordered_attributes() {
        let envelope = ResponseEnvelope::new("Async Send")
            .response_attribute("uniqueTag", "Mon 10 19 14:03:07:123 Z 2026")
            .response_attribute("returnString", "OK")
            .info_attribute("dataServiceName", "Logo")
            .info_attribute("state", "Pending")
            .lot(7);
        assert_eq!(
            render(&envelope),
            concat!(
                "<HDRadio-Envelope><MSAC-Response uniqueTag=\"Mon 10 19 14:03:07:123 Z 2026\" returnString=\"OK\">",
                "<Msg-Info msgType=\"Async Send\" dataServiceName=\"Logo\" state=\"Pending\" />",
                "<Lot-Info lotId=\"7\" />",
                "</MSAC-Response></HDRadio-Envelope>",
            )
        );
    }

    #[test]
    fn escapes_attribute_values() {
        let envelope = ResponseEnvelope::new("Async Send")
            .info_attribute("dataServiceName", "R&B <\"Hits\">");
        let text = render(&envelope);
        assert!(text.contains("dataServiceName=\"R&amp;B &lt;&quot;Hits&quot;&gt;\""));
    }

    #[test]
    fn delimiter_terminates_the_response() {
        let bytes = ResponseEnvelope::new("PSD Send").to_bytes();
        let end = find_delimiter(&bytes).expect("delimiter");
        assert_eq!(end + b"</HDRadio-Envelope>".len(), bytes.len());
    }
}
