//! [`scanner::HeartbeatSink`] implementation backed by a [`StatsDocument`].
//!
//! # Design
//!
//! The scanner crate is generic over any `HeartbeatSink`; this crate
//! supplies the concrete one, keeping `scanner` free of a `stats`
//! dependency (`spec.md` §9's message-passing/aggregator boundary applies
//! equally to this interface boundary). Grounded in the original's
//! `scan_root`, where `my_stats["scanning"]` is the same dict reference
//! nested *inside* the scan's own stats-key section (`my_stats` there is
//! already that section, e.g. `stats[stats_key]`) — a heartbeat never
//! lands as a sibling top-level key. [`ScanHeartbeat`] mirrors that: it
//! writes into `<section>.scanning`, not a bare top-level `scanning` key,
//! matching `spec.md` §4.6/§6.

use std::sync::Mutex;

use chrono::Utc;
use scanner::HeartbeatSink;
use serde_json::json;

use crate::document::StatsDocument;

/// Persists scan heartbeats into `<section>.scanning` of a
/// [`StatsDocument`], where `section` is the same stats-key the scan's
/// [`crate::ScanReport`] is written under.
pub struct ScanHeartbeat {
    document: Mutex<StatsDocument>,
    section: String,
}

impl ScanHeartbeat {
    /// Wraps `document` for heartbeat persistence, nesting updates under
    /// `<section>.scanning`.
    #[must_use]
    pub fn new(document: StatsDocument, section: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(document),
            section: section.into(),
        }
    }

    /// Consumes the sink, returning the underlying document.
    #[must_use]
    pub fn into_inner(self) -> StatsDocument {
        self.document.into_inner().expect("heartbeat mutex poisoned")
    }
}

impl HeartbeatSink for ScanHeartbeat {
    fn record_heartbeat(&self) {
        let now = Utc::now();
        let update = json!({
            "scanning": {
                "heartbeat": now.timestamp(),
                "heartbeat_utc": now.to_rfc3339(),
            }
        });
        let mut document = self.document.lock().expect("heartbeat mutex poisoned");
        if let Err(err) = document.update_section(&self.section, update) {
            tracing::error!(error = %err, "failed to persist scan heartbeat");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn record_heartbeat_writes_scanning_section_nested_under_stats_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let sink = ScanHeartbeat::new(StatsDocument::new(&path), "scanner");
        sink.record_heartbeat();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert!(parsed.get("scanning").is_none(), "heartbeat must not land as a top-level sibling key");
        assert!(parsed["scanner"]["scanning"]["heartbeat"].is_i64());
        assert!(parsed["scanner"]["scanning"]["heartbeat_utc"].is_string());
    }
}
