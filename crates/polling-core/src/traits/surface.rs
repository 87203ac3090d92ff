// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visual container that hosts the embedded survey frame.

use crate::error::PollingError;
use crate::types::{DisplayTarget, PopupRequest};

/// The host's popup shell.
///
/// Both calls are synchronous: they are made while the display controller
/// holds its visibility gate, so implementations must not block on I/O.
pub trait DisplaySurface: Send + Sync + 'static {
    /// Builds the container and points its frame at `request.url`.
    fn mount(&self, request: &PopupRequest) -> Result<(), PollingError>;

    /// Destroys the container previously mounted for `target`.
    fn unmount(&self, target: &DisplayTarget);
}
