//! Opcode routing.

use std::io::{Read, Write};
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;

use crate::connection::{ConnectionBuffer, ConnectionError};
use crate::entities::{LotIdAllocator, SendKind};
use crate::envelope::MsacRequest;
use crate::hooks::MsacHooks;
use crate::server::ServerSettings;

use super::{direct_file_copy, psd, send};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Source of the instant a unique tag is derived from.
pub(crate) type Clock = fn() -> OffsetDateTime;

/// Request types the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Raw file transfer following the envelope.
    DirectFileCopy,
    /// Queue an image for asynchronous transmission.
    AsyncSend,
    /// Queue an image ahead of a synchronised song start.
    SyncPreSend,
    /// Update program service data.
    PsdSend,
}

impl Opcode {
    /// Matches a `msgType` value exactly. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Direct File Copy" => Some(Self::DirectFileCopy),
            "Async Send" => Some(Self::AsyncSend),
            "Sync Pre Send" => Some(Self::SyncPreSend),
            "PSD Send" => Some(Self::PsdSend),
            _ => None,
        }
    }

    /// Returns the wire name, which responses echo as `msgType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectFileCopy => "Direct File Copy",
            Self::AsyncSend => "Async Send",
            Self::SyncPreSend => "Sync Pre Send",
            Self::PsdSend => "PSD Send",
        }
    }
}

/// Routes decoded requests to their handlers and writes the responses.
///
/// One router lives as long as the server, so the lot counter keeps
/// counting across connections.
pub(crate) struct Router {
    pub(super) hooks: Arc<dyn MsacHooks>,
    pub(super) lots: LotIdAllocator,
    pub(super) advertised_os: String,
    pub(super) advertised_version: String,
    pub(super) max_file_bytes: usize,
    pub(super) clock: Clock,
}

impl Router {
    pub(crate) fn new(settings: &ServerSettings, hooks: Arc<dyn MsacHooks>) -> Self {
        Self {
            hooks,
            lots: LotIdAllocator::default(),
            advertised_os: settings.advertised_os.clone(),
            advertised_version: settings.advertised_version.clone(),
            max_file_bytes: settings.max_file_bytes,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Replaces the wall clock used for unique tags.
    #[cfg(test)]
    pub(crate) fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn hooks(&self) -> &dyn MsacHooks {
        self.hooks.as_ref()
    }

    /// Handles one request. Direct File Copy reads its payload from
    /// `connection` before responding.
    ///
    /// # Errors
    ///
    /// Returns the handler's error, or an IO error if the response cannot be
    /// written. Either ends the connection.
    pub(crate) fn route<S: Read + Write>(
        &self,
        request: &MsacRequest,
        connection: &mut ConnectionBuffer<S>,
    ) -> Result<(), ConnectionError> {
        let Some(opcode) = Opcode::parse(request.msg_type()) else {
            debug!(
                target: DISPATCH_TARGET,
                msg_type = request.msg_type(),
                "ignoring unknown opcode"
            );
            return Ok(());
        };

        debug!(
            target: DISPATCH_TARGET,
            opcode = opcode.as_str(),
            "dispatching request"
        );

        let response = match opcode {
            Opcode::DirectFileCopy => direct_file_copy::handle(self, request, connection)?,
            Opcode::AsyncSend => send::handle(self, request, SendKind::Async)?,
            Opcode::SyncPreSend => send::handle(self, request, SendKind::SyncPreSend)?,
            Opcode::PsdSend => psd::handle(self, request)?,
        };
        connection.send(&response.to_bytes())?;
        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("lots", &self.lots)
            .field("advertised_os", &self.advertised_os)
            .field("advertised_version", &self.advertised_version)
            .field("max_file_bytes", &self.max_file_bytes)
            .finish_non_exhaustive()
    }
}
