//! Records handed to the notification hooks.

use std::sync::atomic::{AtomicU16, Ordering};

use time::OffsetDateTime;
use time::macros::format_description;

use crate::envelope::Attributes;

/// Which request produced an [`OutgoingImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    /// `Async Send`.
    Async,
    /// `Sync Pre Send`.
    SyncPreSend,
}

/// An asset the client asked the transmitter to prepare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingImage {
    /// Request that produced this image.
    pub kind: SendKind,
    /// Target data service.
    pub data_service_name: String,
    /// File name as sent by the client.
    pub file_name: String,
    /// Server-assigned lot identifier.
    pub lot_id: u16,
    /// Timestamp-derived tag echoed to the client.
    pub unique_tag: String,
    /// Song duration from `Sync Pre Send`; zero otherwise.
    pub duration: i32,
}

/// Program Service Data: now-playing text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsdRecord {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub album: String,
}

impl PsdRecord {
    /// Reads the optional `core` attributes; absent ones stay empty.
    #[must_use]
    pub fn from_attributes(core: &Attributes) -> Self {
        let text = |name: &str| core.get(name).unwrap_or_default().to_string();
        Self {
            title: text("title"),
            artist: text("artist"),
            genre: text("genre"),
            album: text("album"),
        }
    }
}

/// Extended header controlling display of the associated lot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XhdrRecord {
    pub mime_type: String,
    pub trigger: bool,
    pub blank_screen: bool,
    pub flush_memory: bool,
    pub lot_id: i32,
}

impl XhdrRecord {
    /// Reads the optional `xhdr` attributes. Missing or unparsable booleans
    /// are `false`; missing or unparsable integers are zero.
    #[must_use]
    pub fn from_attributes(xhdr: &Attributes) -> Self {
        let flag = |name: &str| xhdr.get_bool(name).unwrap_or(false);
        Self {
            mime_type: xhdr.get("mimeType").unwrap_or_default().to_string(),
            trigger: flag("trigger"),
            blank_screen: flag("blankScreen"),
            flush_memory: flag("flushMemory"),
            lot_id: xhdr.get_i32("lotId").unwrap_or(0),
        }
    }
}

/// Monotonic 16-bit lot counter that wraps on overflow.
///
/// Atomic so that it stays correct if connections are ever served
/// concurrently.
#[derive(Debug, Default)]
pub struct LotIdAllocator {
    next: AtomicU16,
}

impl LotIdAllocator {
    /// Starts counting at `first`.
    #[must_use]
    pub const fn starting_at(first: u16) -> Self {
        Self {
            next: AtomicU16::new(first),
        }
    }

    /// Returns the current value and advances the counter.
    pub fn allocate(&self) -> u16 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Renders `at` as `ddd MM dd HH:mm:ss:fff K yyyy`, e.g.
/// `Mon 10 19 14:03:07:123 Z 2026`.
///
/// # Errors
///
/// Returns the formatter's error if a component cannot be rendered.
pub fn unique_tag(at: OffsetDateTime) -> Result<String, time::error::Format> {
    let utc = at.to_offset(time::UtcOffset::UTC);
    utc.format(format_description!(
        "[weekday repr:short] [month] [day] [hour]:[minute]:[second]:[subsecond digits:3] Z [year]"
    ))
}
