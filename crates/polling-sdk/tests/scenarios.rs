// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end behaviour of the SDK facade against scripted collaborators.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use polling_client::Endpoints;
use polling_config::PollingConfig;
use polling_core::{
    DisplayTarget, EventOutcome, KeyValueStore, RawTrigger, SurveyId, TriggerSurvey,
    TriggeredSurveyRecord, VisibilityState,
};
use polling_sdk::{BridgeOutcome, Callbacks, FrameMessage, InitOptions, PollingSdk};
use polling_storage::{MemoryKeyValueStore, TriggerStore};
use polling_test_utils::{ApiCall, CallbackRecorder, MockFailure, MockSurveyApi, RecordingSurface};
use serde_json::json;

const TRUSTED: &str = "https://app.polling.com";

struct Harness {
    api: Arc<MockSurveyApi>,
    surface: Arc<RecordingSurface>,
    triggers: TriggerStore,
    recorder: CallbackRecorder,
    sdk: PollingSdk,
}

fn config(with_credentials: bool) -> PollingConfig {
    let mut config = PollingConfig::default();
    if with_credentials {
        config.account.customer_id = Some("cust-1".into());
        config.account.api_key = Some("key-1".into());
    }
    config
}

fn harness_with(config: PollingConfig) -> Harness {
    let api = Arc::new(MockSurveyApi::new());
    let surface = Arc::new(RecordingSurface::new());
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let endpoints = Arc::new(Endpoints::from_config(&config).unwrap());
    let sdk = PollingSdk::new(&config, endpoints, api.clone(), kv.clone(), surface.clone()).unwrap();
    Harness {
        api,
        surface,
        triggers: TriggerStore::new(kv),
        recorder: CallbackRecorder::new(),
        sdk,
    }
}

fn harness() -> Harness {
    harness_with(config(true))
}

impl Harness {
    fn callbacks(&self) -> Callbacks {
        Callbacks::new()
            .on_success(self.recorder.success_handler())
            .on_failure(self.recorder.failure_handler())
            .on_reward(self.recorder.reward_handler())
            .on_survey_available(self.recorder.available_handler())
    }

    fn options(&self) -> InitOptions {
        InitOptions {
            callbacks: self.callbacks(),
            ..Default::default()
        }
    }

    async fn seed(&self, records: &[TriggeredSurveyRecord]) {
        self.triggers.save(records).await.unwrap();
    }

    async fn stored_ids(&self) -> Vec<String> {
        self.triggers
            .load()
            .await
            .into_iter()
            .map(|r| r.survey_id.0)
            .collect()
    }
}

fn record_at(id: &str, due_at: DateTime<Utc>) -> TriggeredSurveyRecord {
    TriggeredSurveyRecord {
        survey_id: SurveyId::from(id),
        display_name: format!("Survey {id}"),
        due_at,
        cumulative_delay_seconds: 0,
    }
}

fn raw_trigger(id: &str, due_at: DateTime<Utc>) -> RawTrigger {
    RawTrigger {
        survey: TriggerSurvey {
            survey_uuid: id.to_string(),
            name: format!("Survey {id}"),
        },
        delayed_timestamp: due_at.to_rfc3339(),
        delay: Some(0),
    }
}

fn survey(id: &str) -> DisplayTarget {
    DisplayTarget::Survey(SurveyId::from(id))
}

fn completed(id: &str, reward_value: serde_json::Value) -> serde_json::Value {
    json!({
        "event": "survey.completed",
        "surveyUuid": id,
        "data": {
            "answers": {"q1": "yes", "q2": 5},
            "reward": {"value": reward_value, "name": "Coins"},
            "sessionId": "sess-1"
        }
    })
}

/// Sets up `[a: due 10s ago, b: due in 10s]` and displays `a` through evaluation.
async fn displaying_a(h: &Harness) -> TriggeredSurveyRecord {
    let now = Utc::now();
    let b = record_at("b", now + Duration::seconds(10));
    h.seed(&[record_at("a", now - Duration::seconds(10)), b.clone()])
        .await;
    assert_eq!(h.sdk.evaluate_triggers().await, Some(SurveyId::from("a")));
    b
}

#[tokio::test]
async fn evaluate_displays_due_survey_and_leaves_future_one() {
    let h = harness();
    let b = displaying_a(&h).await;

    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("a")));
    assert_eq!(h.triggers.load().await[1], b);
    let mounted = h.surface.mounted();
    assert_eq!(mounted.len(), 1);
    assert_eq!(
        mounted[0].url,
        "https://app.polling.com/sdk/survey/a?customer_id=cust-1&api_key=key-1"
    );
}

#[tokio::test]
async fn user_close_postpones_instead_of_removing() {
    let h = harness();
    displaying_a(&h).await;
    let before = h.triggers.load().await[0].clone();

    assert_eq!(h.sdk.dismiss().await, Some(survey("a")));

    assert!(h.sdk.visibility().is_idle());
    assert_eq!(h.surface.current(), None);
    let after = h.triggers.load().await;
    assert_eq!(after[0].survey_id, before.survey_id);
    assert_eq!(after[0].due_at, before.due_at + Duration::minutes(30));
    assert_eq!(after[0].cumulative_delay_seconds, 30 * 60);
    // The postponed survey is no longer due.
    assert_eq!(h.sdk.evaluate_triggers().await, None);
}

#[tokio::test]
async fn completion_removes_trigger_stores_answers_and_rewards() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    let b = displaying_a(&h).await;
    let refreshes_before = h.api.call_count(|c| *c == ApiCall::AvailableSurveys).await;

    let outcome = h
        .sdk
        .handle_bridge_message(TRUSTED, &completed("a", json!("15")))
        .await;

    assert_eq!(outcome, BridgeOutcome::Completed(SurveyId::from("a")));
    assert_eq!(h.stored_ids().await, vec!["b"]);
    assert_eq!(h.triggers.load().await[0], b);
    assert!(h.sdk.visibility().is_idle());
    assert_eq!(h.surface.unmounted(), vec![survey("a")]);

    let stored = h
        .sdk
        .get_local_survey_results(&SurveyId::from("a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&stored).unwrap(),
        json!({"q1": "yes", "q2": 5})
    );

    let successes = h.recorder.successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0]["sessionId"], "sess-1");

    let rewards = h.recorder.rewards();
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].amount, 15);
    assert_eq!(rewards[0].name, "Coins");
    assert_eq!(rewards[0].session_id, "sess-1");

    let refreshes_after = h.api.call_count(|c| *c == ApiCall::AvailableSurveys).await;
    assert_eq!(refreshes_after, refreshes_before + 1);
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn completion_without_positive_reward_skips_reward_callback() {
    let h = harness();
    h.sdk.initialize(h.options()).await;

    for value in [json!(0), json!("-3"), json!("none")] {
        h.sdk
            .handle_bridge_message(TRUSTED, &completed("a", value))
            .await;
    }

    assert_eq!(h.recorder.successes().len(), 3);
    assert!(h.recorder.rewards().is_empty());
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn error_and_empty_remove_trigger_without_callbacks() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    let now = Utc::now() + Duration::hours(1);
    h.seed(&[record_at("x", now), record_at("y", now), record_at("z", now)])
        .await;
    let calls_before = h.api.calls().await.len();

    let err = h
        .sdk
        .handle_bridge_message(TRUSTED, &json!({"event": "survey.error", "surveyUuid": "x"}))
        .await;
    let empty = h
        .sdk
        .handle_bridge_message(TRUSTED, &json!({"event": "survey.empty", "surveyUuid": "z"}))
        .await;

    assert_eq!(err, BridgeOutcome::Closed(SurveyId::from("x")));
    assert_eq!(empty, BridgeOutcome::Closed(SurveyId::from("z")));
    assert_eq!(h.stored_ids().await, vec!["y"]);
    assert!(h.recorder.is_silent());
    assert_eq!(h.api.calls().await.len(), calls_before);
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn terminal_event_closes_the_popup_it_belongs_to() {
    let h = harness();
    displaying_a(&h).await;

    h.sdk
        .handle_bridge_message(TRUSTED, &json!({"event": "survey.empty", "surveyUuid": "a"}))
        .await;

    assert!(h.sdk.visibility().is_idle());
    assert_eq!(h.stored_ids().await, vec!["b"]);
}

#[tokio::test]
async fn stale_terminal_event_leaves_other_popup_open() {
    let h = harness();
    displaying_a(&h).await;

    h.sdk
        .handle_bridge_message(TRUSTED, &json!({"event": "survey.error", "surveyUuid": "b"}))
        .await;

    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("a")));
    assert_eq!(h.stored_ids().await, vec!["a"]);
}

#[tokio::test]
async fn untrusted_origin_changes_nothing() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    displaying_a(&h).await;
    let before = h.triggers.load().await;
    let calls_before = h.api.calls().await.len();

    for origin in ["https://evil.example.com", "https://polling.com.evil.net"] {
        let outcome = h
            .sdk
            .handle_bridge_message(origin, &completed("a", json!(100)))
            .await;
        assert_eq!(outcome, BridgeOutcome::Rejected);
    }

    assert_eq!(h.triggers.load().await, before);
    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("a")));
    assert!(h.recorder.successes().is_empty());
    assert!(h.recorder.rewards().is_empty());
    assert!(
        h.sdk
            .get_local_survey_results(&SurveyId::from("a"))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(h.api.calls().await.len(), calls_before);
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn unknown_event_is_ignored() {
    let h = harness();
    displaying_a(&h).await;

    let outcome = h
        .sdk
        .handle_bridge_message(TRUSTED, &json!({"event": "survey.resized", "surveyUuid": "a"}))
        .await;

    assert_eq!(outcome, BridgeOutcome::Ignored);
    assert_eq!(h.stored_ids().await, vec!["a", "b"]);
    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("a")));
}

#[tokio::test]
async fn initialize_runs_first_tick_and_is_idempotent() {
    let h = harness();
    h.api.set_available(MockSurveyApi::snapshot(&["s1", "s2"])).await;
    h.seed(&[record_at("due", Utc::now() - Duration::seconds(1))])
        .await;

    assert!(h.sdk.initialize(h.options()).await);
    assert_eq!(h.api.call_count(|c| *c == ApiCall::AvailableSurveys).await, 1);
    assert_eq!(h.sdk.available_surveys().count(), 2);
    assert_eq!(h.recorder.available_count(), 1);
    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("due")));

    assert!(!h.sdk.initialize(h.options()).await);
    assert_eq!(h.api.call_count(|c| *c == ApiCall::AvailableSurveys).await, 1);
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn tick_without_credentials_is_a_no_op() {
    let h = harness_with(config(false));
    h.seed(&[record_at("due", Utc::now() - Duration::seconds(1))])
        .await;

    h.sdk.initialize(h.options()).await;

    assert!(h.api.calls().await.is_empty());
    assert!(h.sdk.visibility().is_idle());
    h.sdk.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn credentials_set_later_are_picked_up_by_the_timer() {
    let h = harness_with(config(false));
    h.sdk.initialize(h.options()).await;
    assert!(h.api.calls().await.is_empty());

    h.sdk.set_customer_id("cust-9");
    h.sdk.set_api_key("key-9");
    tokio::time::sleep(StdDuration::from_secs(61)).await;

    assert_eq!(h.api.call_count(|c| *c == ApiCall::AvailableSurveys).await, 1);
    assert!(
        h.sdk
            .available_surveys_view_url()
            .unwrap()
            .as_str()
            .ends_with("?customer_id=cust-9&api_key=key-9")
    );
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn disabled_availability_poll_still_evaluates() {
    let h = harness();
    h.seed(&[record_at("due", Utc::now() - Duration::seconds(1))])
        .await;

    h.sdk
        .initialize(InitOptions {
            disable_available_surveys_poll: Some(true),
            ..h.options()
        })
        .await;

    assert_eq!(h.api.call_count(|c| *c == ApiCall::AvailableSurveys).await, 0);
    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("due")));
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn availability_failure_reaches_failure_callback() {
    let h = harness();
    h.api.push_available(Err(MockFailure::Status(500))).await;

    h.sdk.initialize(h.options()).await;

    assert_eq!(h.recorder.failures(), vec!["Failed to load: 500".to_string()]);
    assert_eq!(h.sdk.available_surveys().count(), 0);
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn logged_event_triggers_are_ingested_and_shown() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    let past = Utc::now() - Duration::seconds(5);
    h.api
        .push_event(Ok(EventOutcome {
            triggered_surveys: Some(vec![
                raw_trigger("t1", past),
                raw_trigger("t2", past + Duration::hours(2)),
                raw_trigger("t1", past),
            ]),
        }))
        .await;

    h.sdk.log_purchase(1299).await.unwrap();

    assert!(h.api.calls().await.contains(&ApiCall::LogEvent {
        name: "Purchase".into(),
        value: "1299".into()
    }));
    assert_eq!(h.stored_ids().await, vec!["t2", "t1"]);
    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("t1")));
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn failed_event_reports_and_keeps_store() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    h.api.push_event(Err(MockFailure::Status(500))).await;
    h.api.push_event(Err(MockFailure::Network)).await;

    assert!(h.sdk.log_session().await.is_err());
    assert!(h.sdk.log_event("Signup", "pro").await.is_err());

    assert_eq!(
        h.recorder.failures(),
        vec!["Failed to log event: 500".to_string(), "Network error.".to_string()]
    );
    assert!(h.stored_ids().await.is_empty());
    assert!(h.api.calls().await.contains(&ApiCall::LogEvent {
        name: "Session".into(),
        value: String::new()
    }));
    h.sdk.shutdown().await;
}

#[tokio::test]
async fn embed_view_dismissal_postpones_nothing() {
    let h = harness();
    let future = record_at("f", Utc::now() + Duration::minutes(5));
    h.seed(&[future.clone()]).await;

    assert!(h.sdk.show_embed_view().unwrap());
    assert!(!h.sdk.show_survey("other").unwrap());
    assert_eq!(h.sdk.dismiss().await, Some(DisplayTarget::EmbedView));

    assert_eq!(h.triggers.load().await, vec![future]);
    assert!(h.sdk.visibility().is_idle());
}

#[tokio::test]
async fn explicit_show_respects_the_single_popup_gate() {
    let h = harness();

    assert!(h.sdk.show_survey("a").unwrap());
    assert!(!h.sdk.show_survey("b").unwrap());
    assert!(!h.sdk.show_embed_view().unwrap());

    assert_eq!(h.surface.mounted().len(), 1);
    assert_eq!(h.sdk.visibility(), VisibilityState::Displaying(survey("a")));
}

#[tokio::test]
async fn messages_sent_through_the_bridge_channel_are_handled() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    h.seed(&[record_at("q", Utc::now() + Duration::hours(1))])
        .await;

    h.sdk
        .bridge_sender()
        .send(FrameMessage::new(
            "https://polling.com",
            json!({"event": "survey.error", "surveyUuid": "q"}),
        ))
        .await
        .unwrap();

    tokio::time::timeout(StdDuration::from_secs(5), async {
        while !h.stored_ids().await.is_empty() {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
    })
    .await
    .expect("bridge listener should remove the trigger");
    h.sdk.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_polling() {
    let h = harness();
    h.sdk.initialize(h.options()).await;
    h.sdk.shutdown().await;
    let calls = h.api.calls().await.len();

    tokio::time::sleep(StdDuration::from_secs(300)).await;

    assert_eq!(h.api.calls().await.len(), calls);
}
