// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embeddable client SDK for Polling surveys.
//!
//! The SDK periodically refreshes the surveys available to a customer,
//! decides which server-triggered survey (if any) is due for display, shows
//! at most one survey popup at a time, and reacts to completion and error
//! signals posted by the embedded survey frame.
//!
//! # Components
//!
//! - [`AvailabilityCache`] - latest available-surveys snapshot and 0→N notification
//! - [`TriggerScheduler`] - due-survey selection, dedup, postpone and removal
//! - [`DisplayController`] - single-popup visibility gate
//! - [`BridgeHandler`] - origin check and dispatch of frame messages
//! - [`PollDriver`] - the recurring refresh/evaluate timer
//! - [`PollingSdk`] - the facade hosts use

pub mod availability;
pub mod bridge;
pub mod callbacks;
pub mod display;
pub mod poll;
pub mod scheduler;
pub mod sdk;

pub use availability::AvailabilityCache;
pub use bridge::{
    BridgeHandler, BridgeMessage, BridgeOutcome, Completion, FrameMessage, OriginPolicy,
    parse_reward_amount,
};
pub use callbacks::{Callbacks, SharedCallbacks};
pub use display::DisplayController;
pub use poll::{PollDriver, PollTarget};
pub use scheduler::{TriggerScheduler, merge_triggers};
pub use sdk::{InitOptions, PollingSdk};
