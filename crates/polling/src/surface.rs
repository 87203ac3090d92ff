// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display surface that announces popups as JSON lines.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use polling_core::{DisplaySurface, DisplayTarget, PollingError, PopupRequest};
use serde_json::json;

/// Writes one JSON object per mount/unmount to the wrapped writer.
pub struct TerminalSurface<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, line: &serde_json::Value) -> std::io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{line}")?;
        out.flush()
    }
}

fn target_json(target: &DisplayTarget) -> serde_json::Value {
    match target {
        DisplayTarget::Survey(id) => json!({"survey_id": id}),
        DisplayTarget::EmbedView => json!({"embed_view": true}),
    }
}

impl<W: Write + Send + 'static> DisplaySurface for TerminalSurface<W> {
    fn mount(&self, request: &PopupRequest) -> Result<(), PollingError> {
        let line = json!({
            "popup": "open",
            "target": target_json(&request.target),
            "mode": request.mode.to_string(),
            "url": request.url,
        });
        self.emit(&line).map_err(|e| PollingError::Display {
            message: format!("failed to write popup: {e}"),
        })
    }

    fn unmount(&self, target: &DisplayTarget) {
        let line = json!({"popup": "close", "target": target_json(target)});
        if let Err(e) = self.emit(&line) {
            tracing::warn!(error = %e, "failed to write popup close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polling_core::{PresentationMode, SurveyId};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_open_and_close_lines() {
        let buf = Shared::default();
        let surface = TerminalSurface::new(buf.clone());
        let target = DisplayTarget::Survey(SurveyId::from("s1"));

        surface
            .mount(&PopupRequest {
                target: target.clone(),
                url: "https://app.polling.com/sdk/survey/s1".into(),
                mode: PresentationMode::Corner,
            })
            .unwrap();
        surface.unmount(&target);

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["popup"], "open");
        assert_eq!(lines[0]["mode"], "corner");
        assert_eq!(lines[0]["target"]["survey_id"], "s1");
        assert_eq!(lines[1]["popup"], "close");
    }
}
