//! Prompt text for the coaching conversation
//!
//! Everything the model is told lives here: the coach persona, the
//! initial-context message that carries the workout data, the canned
//! first-turn analysis request, and the summarization instruction used
//! during compaction. Keeping the text in one module makes prompt changes
//! reviewable without touching session logic.

use crate::session::ActivityContext;

/// The coach persona, sent as the conversation's system message.
pub fn system_prompt() -> String {
    "You are an experienced AI running coach specializing in half-marathon preparation.

Your personality:
- Professional but encouraging and motivational
- Data-driven but also considers subjective runner feedback
- Focuses on practical, actionable advice
- Remembers context from previous parts of the conversation
- Personalizes advice based on the runner's specific workout data

Your capabilities:
- Analyze workout patterns and performance trends
- Provide training recommendations and race preparation
- Answer specific questions about running technique, nutrition, recovery
- Create personalized training plans
- Help with race strategy and goal setting

Always maintain context of the runner's specific workout data and previous conversation when responding."
        .to_string()
}

/// The initial user message: runner identity, workout data, and feedback.
///
/// The data block differs by context shape: a single activity is presented
/// as one record, a batch as the full list.
pub fn initial_context(user_id: &str, context: &ActivityContext, feedback: &str) -> String {
    let (label, data) = match context {
        ActivityContext::Single(activity) => (
            "WORKOUT DATA FOR ANALYSIS:",
            serde_json::to_string_pretty(activity).unwrap_or_else(|_| "{}".to_string()),
        ),
        ActivityContext::Batch(activities) => (
            "RECENT WORKOUT DATA FOR ANALYSIS:",
            serde_json::to_string_pretty(activities).unwrap_or_else(|_| "[]".to_string()),
        ),
    };

    format!(
        "RUNNER PROFILE: {user_id}\n\n{label}\n{data}\n\nINITIAL RUNNER FEEDBACK: \"{feedback}\"\n\nCONTEXT: This runner is preparing for an upcoming half marathon. \nPlease analyze their workout data and be ready to answer follow-up questions about their training."
    )
}

/// The canned question that opens the conversation.
pub fn initial_analysis_prompt() -> String {
    "Based on the workout data provided, please give me a comprehensive analysis including:

1. Overall performance analysis across all activities
2. Training pattern assessment (intensity, volume, recovery balance)
3. Performance trends and progression
4. Specific recommendations for half marathon preparation
5. Proposed training plan for the next 2 weeks

Please be specific and actionable in your recommendations."
        .to_string()
}

/// System message for the summarization side-call.
pub fn summarizer_system_prompt() -> String {
    "You are a helpful assistant that summarizes conversations.".to_string()
}

/// Instruction wrapped around the transcript being compacted away.
pub fn summary_request(transcript: &str) -> String {
    format!(
        "Please summarize this conversation between a runner and their AI coach. Keep it concise but preserve key insights, recommendations, and important context:\n\n{transcript}\n\nProvide a 2-3 sentence summary that captures the main topics discussed and any important coaching advice given."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_describes_the_coach() {
        let prompt = system_prompt();
        assert!(prompt.contains("running coach"));
        assert!(prompt.contains("half-marathon"));
    }

    #[test]
    fn test_initial_context_single_embeds_activity_and_feedback() {
        let context = ActivityContext::Single(serde_json::json!({"name": "Morning Run"}));
        let text = initial_context("alice", &context, "legs felt heavy");
        assert!(text.contains("RUNNER PROFILE: alice"));
        assert!(text.contains("Morning Run"));
        assert!(text.contains("legs felt heavy"));
        assert!(text.contains("WORKOUT DATA FOR ANALYSIS:"));
    }

    #[test]
    fn test_initial_context_batch_uses_batch_label() {
        let context = ActivityContext::Batch(vec![serde_json::json!({"name": "Run 1"})]);
        let text = initial_context("alice", &context, "good week");
        assert!(text.contains("RECENT WORKOUT DATA FOR ANALYSIS:"));
        assert!(text.contains("Run 1"));
    }

    #[test]
    fn test_summary_request_wraps_transcript() {
        let text = summary_request("user: hi\nassistant: hello");
        assert!(text.contains("user: hi"));
        assert!(text.contains("2-3 sentence summary"));
    }
}
