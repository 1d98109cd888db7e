//! Shared fixtures for the server test suites.

mod hooks;
mod wire;

pub(crate) use self::hooks::{Notification, RecordingHooks};
pub(crate) use self::wire::{
    async_send, direct_file_copy, psd_send, read_envelope, request_envelope, sync_pre_send,
};
