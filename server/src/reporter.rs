//! Match result reporting

use std::sync::Mutex;

use arena_battle::MatchResult;
use tracing::info;

/// Receives each finished battle's result exactly once
pub trait MatchReporter: Send + Sync {
    fn report_result(&self, battle_id: &str, result: &MatchResult);
}

/// Reporter that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl MatchReporter for LogReporter {
    fn report_result(&self, battle_id: &str, result: &MatchResult) {
        info!(battle = %battle_id, winner = %result.winner, loser = %result.loser, "match result");
    }
}

/// Reporter that keeps every result, for inspection
#[derive(Debug, Default)]
pub struct RecordingReporter {
    results: Mutex<Vec<(String, MatchResult)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all results reported so far
    pub fn results(&self) -> Vec<(String, MatchResult)> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl MatchReporter for RecordingReporter {
    fn report_result(&self, battle_id: &str, result: &MatchResult) {
        if let Ok(mut results) = self.results.lock() {
            results.push((battle_id.to_string(), result.clone()));
        }
    }
}
