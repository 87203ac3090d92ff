// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SDK Facade: the public surface that wires the components together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use polling_client::{Endpoints, PollingApiClient, Url};
use polling_config::PollingConfig;
use polling_core::{
    AvailableSurveysSnapshot, DisplaySurface, DisplayTarget, EventOutcome, KeyValueStore,
    PollingError, SurveyApi, SurveyId, TriggeredSurveyRecord, VisibilityState,
};
use polling_storage::{SurveyResultStore, TriggerStore};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::availability::AvailabilityCache;
use crate::bridge::{self, BridgeHandler, BridgeOutcome, FrameMessage, OriginPolicy};
use crate::callbacks::{Callbacks, SharedCallbacks};
use crate::display::DisplayController;
use crate::poll::{PollDriver, PollTarget};
use crate::scheduler::TriggerScheduler;

/// Capacity of the frame message channel.
const BRIDGE_CHANNEL_CAPACITY: usize = 64;

/// Options accepted by [`PollingSdk::initialize`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Overrides the configured customer id when set.
    pub customer_id: Option<String>,
    /// Overrides the configured API key when set.
    pub api_key: Option<String>,
    pub callbacks: Callbacks,
    /// Overrides `polling.disable_available_surveys_poll` when set.
    pub disable_available_surveys_poll: Option<bool>,
}

/// State shared with the poll timer.
struct Core {
    endpoints: Arc<Endpoints>,
    availability: Arc<AvailabilityCache>,
    scheduler: Arc<TriggerScheduler>,
    availability_poll_disabled: AtomicBool,
}

#[async_trait]
impl PollTarget for Core {
    async fn tick(&self) {
        if !self.endpoints.is_configured() {
            debug!("credentials incomplete, skipping poll tick");
            return;
        }
        if !self.availability_poll_disabled.load(Ordering::SeqCst) {
            // Failures are reported through the failure callback by the cache.
            let _ = self.availability.refresh().await;
        }
        self.scheduler.evaluate().await;
    }
}

struct Listener {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// The embeddable survey SDK.
pub struct PollingSdk {
    core: Arc<Core>,
    api: Arc<dyn SurveyApi>,
    display: Arc<DisplayController>,
    results: SurveyResultStore,
    callbacks: Arc<SharedCallbacks>,
    bridge: Arc<BridgeHandler>,
    poll: PollDriver,
    bridge_tx: mpsc::Sender<FrameMessage>,
    bridge_rx: Mutex<Option<mpsc::Receiver<FrameMessage>>>,
    listener: Mutex<Option<Listener>>,
    initialized: AtomicBool,
}

impl PollingSdk {
    /// Assembles the SDK from its collaborators.
    ///
    /// `endpoints` must be the instance `api` builds its requests from, so
    /// that credential changes reach both.
    pub fn new(
        config: &PollingConfig,
        endpoints: Arc<Endpoints>,
        api: Arc<dyn SurveyApi>,
        kv: Arc<dyn KeyValueStore>,
        surface: Arc<dyn DisplaySurface>,
    ) -> Result<Self, PollingError> {
        let callbacks = Arc::new(SharedCallbacks::default());
        let display = Arc::new(DisplayController::new(
            surface,
            endpoints.clone(),
            config.display.presentation,
        ));
        let availability = Arc::new(AvailabilityCache::new(api.clone(), callbacks.clone()));
        let scheduler = Arc::new(TriggerScheduler::new(
            TriggerStore::new(kv.clone()),
            api.clone(),
            display.clone(),
            callbacks.clone(),
            config.polling.close_postpone_minutes,
        ));
        let results = SurveyResultStore::new(kv);
        let bridge = Arc::new(BridgeHandler::new(
            OriginPolicy::new(&config.bridge.trusted_domain)?,
            scheduler.clone(),
            display.clone(),
            availability.clone(),
            results.clone(),
            callbacks.clone(),
        ));
        let (bridge_tx, bridge_rx) = mpsc::channel(BRIDGE_CHANNEL_CAPACITY);

        Ok(Self {
            core: Arc::new(Core {
                endpoints,
                availability,
                scheduler,
                availability_poll_disabled: AtomicBool::new(
                    config.polling.disable_available_surveys_poll,
                ),
            }),
            api,
            display,
            results,
            callbacks,
            bridge,
            poll: PollDriver::new(Duration::from_secs(config.polling.poll_interval_secs)),
            bridge_tx,
            bridge_rx: Mutex::new(Some(bridge_rx)),
            listener: Mutex::new(None),
            initialized: AtomicBool::new(false),
        })
    }

    /// Builds the SDK with the HTTP client for the configured endpoints.
    pub fn from_config(
        config: &PollingConfig,
        kv: Arc<dyn KeyValueStore>,
        surface: Arc<dyn DisplaySurface>,
    ) -> Result<Self, PollingError> {
        let endpoints = Arc::new(Endpoints::from_config(config)?);
        let api = Arc::new(PollingApiClient::from_config(config, endpoints.clone())?);
        Self::new(config, endpoints, api, kv, surface)
    }

    /// Starts the SDK: applies `options`, starts the bridge listener and arms
    /// the poll timer, running the first tick before returning.
    ///
    /// Only the first call has any effect; later calls return `false`.
    pub async fn initialize(&self, options: InitOptions) -> bool {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("already initialized");
            return false;
        }

        if let Some(customer_id) = options.customer_id.filter(|s| !s.is_empty()) {
            self.core.endpoints.set_customer_id(customer_id);
        }
        if let Some(api_key) = options.api_key.filter(|s| !s.is_empty()) {
            self.core.endpoints.set_api_key(api_key);
        }
        if let Some(disabled) = options.disable_available_surveys_poll {
            self.core
                .availability_poll_disabled
                .store(disabled, Ordering::SeqCst);
        }
        self.callbacks.replace(options.callbacks);

        self.start_listener();
        info!(
            configured = self.core.endpoints.is_configured(),
            presentation = %self.display.presentation(),
            "polling sdk initialized"
        );
        self.poll.arm(self.core.clone()).await;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn start_listener(&self) {
        let rx = self
            .bridge_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(rx) = rx else {
            return;
        };
        let cancel = CancellationToken::new();
        let handle = bridge::spawn_listener(self.bridge.clone(), rx, cancel.clone());
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Listener { cancel, handle });
    }

    pub fn set_customer_id(&self, customer_id: impl Into<String>) {
        self.core.endpoints.set_customer_id(customer_id);
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.core.endpoints.set_api_key(api_key);
    }

    /// Submits an event and schedules any triggers the response carries.
    ///
    /// A failed submission is reported through the failure callback and
    /// returned.
    pub async fn log_event(&self, name: &str, value: &str) -> Result<EventOutcome, PollingError> {
        let outcome = match self.api.log_event(name, value).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(event = name, error = %e, "event submission failed");
                self.callbacks.failure(e.failure_message());
                return Err(e);
            }
        };

        if !outcome.triggers().is_empty() {
            info!(event = name, triggers = outcome.triggers().len(), "event triggered surveys");
            if let Err(e) = self.core.scheduler.ingest(outcome.triggers()).await {
                warn!(error = %e, "failed to persist triggered surveys");
            }
        }
        Ok(outcome)
    }

    /// Logs a `Purchase` event worth `integer_cents`.
    pub async fn log_purchase(&self, integer_cents: i64) -> Result<EventOutcome, PollingError> {
        self.log_event("Purchase", &integer_cents.to_string()).await
    }

    /// Logs a `Session` event.
    pub async fn log_session(&self) -> Result<EventOutcome, PollingError> {
        self.log_event("Session", "").await
    }

    /// Shows `survey_id` unless a popup is already displayed.
    pub fn show_survey(&self, survey_id: impl Into<SurveyId>) -> Result<bool, PollingError> {
        self.show(DisplayTarget::Survey(survey_id.into()))
    }

    /// Shows the account's default embed view unless a popup is already displayed.
    pub fn show_embed_view(&self) -> Result<bool, PollingError> {
        self.show(DisplayTarget::EmbedView)
    }

    fn show(&self, target: DisplayTarget) -> Result<bool, PollingError> {
        self.display.show(target).inspect_err(|e| {
            warn!(error = %e, "failed to display popup");
        })
    }

    /// User closed the popup. A survey closed this way is postponed, never
    /// removed; closing the embed view postpones nothing.
    pub async fn dismiss(&self) -> Option<DisplayTarget> {
        self.core.scheduler.dismiss().await
    }

    /// The stored answers of a survey completed on this device.
    pub async fn get_local_survey_results(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Option<String>, PollingError> {
        self.results.get(survey_id).await
    }

    /// The most recently fetched available-surveys snapshot.
    pub fn available_surveys(&self) -> AvailableSurveysSnapshot {
        self.core.availability.snapshot()
    }

    /// Fetches the available surveys now instead of waiting for the next tick.
    pub async fn refresh_available_surveys(&self) -> Result<usize, PollingError> {
        self.core.availability.refresh().await
    }

    /// Frame URL listing every survey available to the current customer.
    pub fn available_surveys_view_url(&self) -> Result<Url, PollingError> {
        self.core.endpoints.available_surveys_view_url()
    }

    pub fn visibility(&self) -> VisibilityState {
        self.display.state()
    }

    /// The stored triggered surveys, in stored order.
    pub async fn triggered_surveys(&self) -> Vec<TriggeredSurveyRecord> {
        self.core.scheduler.records().await
    }

    /// Runs one scheduler evaluation outside the poll cycle.
    pub async fn evaluate_triggers(&self) -> Option<SurveyId> {
        self.core.scheduler.evaluate().await
    }

    /// Sender through which the host forwards frame messages to the bridge
    /// listener started by [`initialize`](Self::initialize).
    pub fn bridge_sender(&self) -> mpsc::Sender<FrameMessage> {
        self.bridge_tx.clone()
    }

    /// Processes one frame message directly, bypassing the listener queue.
    pub async fn handle_bridge_message(&self, origin: &str, data: &Value) -> BridgeOutcome {
        self.bridge.handle(origin, data).await
    }

    /// Stops the poll timer and the bridge listener. Messages still queued
    /// for the listener are dropped.
    pub async fn shutdown(&self) {
        self.poll.disarm().await;
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.cancel.cancel();
            let _ = listener.handle.await;
        }
        info!("polling sdk shut down");
    }
}
