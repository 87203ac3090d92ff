// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display Controller: the single-popup visibility gate.
//!
//! ```text
//! Idle --show(target)--> Displaying(target) --dismiss | release--> Idle
//! ```
//!
//! `show` while displaying is a silent no-op. The gate is a plain mutex that
//! is checked and set synchronously, before any further async work happens
//! for the new popup.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use polling_client::Endpoints;
use polling_core::{
    DisplaySurface, DisplayTarget, PollingError, PopupRequest, PresentationMode, SurveyId,
    VisibilityState,
};
use tracing::{debug, info};

pub struct DisplayController {
    surface: Arc<dyn DisplaySurface>,
    endpoints: Arc<Endpoints>,
    mode: PresentationMode,
    state: Mutex<VisibilityState>,
}

impl DisplayController {
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        endpoints: Arc<Endpoints>,
        mode: PresentationMode,
    ) -> Self {
        Self {
            surface,
            endpoints,
            mode,
            state: Mutex::new(VisibilityState::Idle),
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.lock().clone()
    }

    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    pub fn presentation(&self) -> PresentationMode {
        self.mode
    }

    /// Mounts a popup for `target` if nothing is displayed.
    ///
    /// Returns `Ok(false)` when another popup is already on screen. If the URL
    /// cannot be built or the surface refuses to mount, the controller stays
    /// idle and the error is returned.
    pub fn show(&self, target: DisplayTarget) -> Result<bool, PollingError> {
        let mut state = self.lock();
        if let Some(current) = state.target() {
            debug!(requested = %target, current = %current, "popup already displayed, ignoring show");
            return Ok(false);
        }

        let url = match &target {
            DisplayTarget::Survey(id) => self.endpoints.survey_view_url(id)?,
            DisplayTarget::EmbedView => self.endpoints.embed_view_url()?,
        };
        let request = PopupRequest {
            target: target.clone(),
            url: url.into(),
            mode: self.mode,
        };
        self.surface.mount(&request)?;

        info!(target = %target, mode = %self.mode, "popup displayed");
        *state = VisibilityState::Displaying(target);
        Ok(true)
    }

    /// User-initiated close. Unmounts the popup and returns what was shown.
    ///
    /// Postponing the survey is the caller's job.
    pub fn dismiss(&self) -> Option<DisplayTarget> {
        let mut state = self.lock();
        let VisibilityState::Displaying(target) = std::mem::take(&mut *state) else {
            debug!("dismiss with no popup displayed");
            return None;
        };
        self.surface.unmount(&target);
        info!(target = %target, "popup dismissed");
        Some(target)
    }

    /// Frame-initiated close after a terminal bridge event for `survey_id`.
    ///
    /// Only closes the popup if it shows that survey or the embed view, which
    /// hosts whichever survey the user picked. Returns whether it closed.
    pub fn release(&self, survey_id: &SurveyId) -> bool {
        let mut state = self.lock();
        let matches = match state.target() {
            Some(DisplayTarget::Survey(shown)) => shown == survey_id,
            Some(DisplayTarget::EmbedView) => true,
            None => false,
        };
        if !matches {
            debug!(survey_id = %survey_id, "terminal event for a survey not on screen");
            return false;
        }

        if let VisibilityState::Displaying(target) = std::mem::take(&mut *state) {
            self.surface.unmount(&target);
            info!(target = %target, survey_id = %survey_id, "popup closed by survey frame");
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, VisibilityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
