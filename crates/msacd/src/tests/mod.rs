//! Test suites for the MSAC server.

pub(crate) mod support;
