use gen_ai::TokenTracker;
use serde::Serialize;

/// Usage summary printed by `--stats`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub model: String,
    pub prompt_bytes: usize,
    pub response_bytes: usize,
    pub tokens: u64,
    pub turns: u64,
    pub files_stored: u64,
    pub function_calls: u64,
}

impl Stats {
    pub fn collect(model: &str, prompt: &str, response: &str, tracker: &TokenTracker) -> Self {
        Self {
            model: model.to_string(),
            prompt_bytes: prompt.len(),
            response_bytes: response.len(),
            tokens: tracker.total_tokens(),
            turns: tracker.call_count(),
            files_stored: tracker.files_stored(),
            function_calls: tracker.function_calls(),
        }
    }

    /// `{"stats":{...}}` on one line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope { stats: self })
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    stats: &'a Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_ai::TokenUsage;
    use gen_common::FunctionKind;

    #[test]
    fn collects_tracker_totals() {
        let mut tracker = TokenTracker::new();
        tracker.record(&TokenUsage {
            input_tokens: 100,
            output_tokens: 20,
        });
        tracker.record(&TokenUsage {
            input_tokens: 150,
            output_tokens: 30,
        });
        tracker.record_function(FunctionKind::Execute);
        tracker.record_files(2);

        let stats = Stats::collect("gemini-2.5-flash", "list files", "a.txt", &tracker);
        assert_eq!(stats.prompt_bytes, 10);
        assert_eq!(stats.response_bytes, 5);
        assert_eq!(stats.tokens, 300);
        assert_eq!(stats.turns, 2);
        assert_eq!(stats.files_stored, 2);
        assert_eq!(stats.function_calls, 1);
    }

    #[test]
    fn json_uses_camel_case_under_stats_key() {
        let stats = Stats::collect("m", "p", "", &TokenTracker::new());
        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();

        assert_eq!(json["stats"]["model"], "m");
        assert_eq!(json["stats"]["promptBytes"], 1);
        assert_eq!(json["stats"]["responseBytes"], 0);
        assert_eq!(json["stats"]["filesStored"], 0);
        assert!(json["stats"].get("functionCalls").is_some());
    }
}
