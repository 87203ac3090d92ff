// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display surface that records what it was asked to show.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use polling_core::{DisplaySurface, DisplayTarget, PollingError, PopupRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Mounted(PopupRequest),
    Unmounted(DisplayTarget),
}

/// A [`DisplaySurface`] that keeps every mount and unmount for inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    fail_next_mount: AtomicBool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `mount` call fail.
    pub fn fail_next_mount(&self) {
        self.fail_next_mount.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests that were successfully mounted, in order.
    pub fn mounted(&self) -> Vec<PopupRequest> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Mounted(request) => Some(request),
                SurfaceEvent::Unmounted(_) => None,
            })
            .collect()
    }

    pub fn unmounted(&self) -> Vec<DisplayTarget> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Unmounted(target) => Some(target),
                SurfaceEvent::Mounted(_) => None,
            })
            .collect()
    }

    /// The popup currently on screen, if any.
    pub fn current(&self) -> Option<PopupRequest> {
        let mut open: Option<PopupRequest> = None;
        for event in self.events() {
            match event {
                SurfaceEvent::Mounted(request) => open = Some(request),
                SurfaceEvent::Unmounted(target) => {
                    if open.as_ref().is_some_and(|r| r.target == target) {
                        open = None;
                    }
                }
            }
        }
        open
    }

    fn push(&self, event: SurfaceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl DisplaySurface for RecordingSurface {
    fn mount(&self, request: &PopupRequest) -> Result<(), PollingError> {
        if self.fail_next_mount.swap(false, Ordering::SeqCst) {
            return Err(PollingError::Display {
                message: "mock mount failure".into(),
            });
        }
        self.push(SurfaceEvent::Mounted(request.clone()));
        Ok(())
    }

    fn unmount(&self, target: &DisplayTarget) {
        self.push(SurfaceEvent::Unmounted(target.clone()));
    }
}
