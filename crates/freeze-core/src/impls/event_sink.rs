//! EventSink 実装
//!
//! - `TracingEventSink`: 本番用、`audit` target に構造化ログを出す
//! - `RecordingEventSink`: テスト用、イベントをメモリに溜める

use std::sync::Mutex;

use tracing::info;

use crate::domain::LeagueEvent;
use crate::ports::EventSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: LeagueEvent) {
        // JSON にできなかった場合でも Debug 表現で残す
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| format!("{event:?}"));
        info!(target: "audit", event = event.name(), %payload, "league event");
    }
}

#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<LeagueEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LeagueEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: LeagueEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingEventSink::new();
        sink.emit(LeagueEvent::FreezeBegan { season: 12, week: 6 });
        sink.emit(LeagueEvent::FreezeEnded {
            season: 12,
            week: 6,
            winners: 1,
            losers: 0,
        });

        let names: Vec<_> = sink.events().iter().map(LeagueEvent::name).collect();
        assert_eq!(names, vec!["freeze_began", "freeze_ended"]);
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        TracingEventSink.emit(LeagueEvent::FreezeBegan { season: 12, week: 6 });
    }
}
