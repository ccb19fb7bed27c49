//! Best-effort token counting used to pre-populate `usage.prompt_tokens`
//! before a streaming request is issued. Grounded on the contract described
//! by `llm/utils/openai.py::num_tokens_from_messages` — not its tiktoken BPE
//! implementation, which is out of scope here (a single model family's exact
//! tokenizer is an external collaborator). The approximation below never
//! fails the request: a bad input just yields `None`.

use serde_json::Value;

const TOKENS_PER_MESSAGE: u64 = 3;
const TOKENS_PER_NAME: u64 = 1;
const REPLY_PRIMING_TOKENS: u64 = 3;

/// Rough token estimate for an arbitrary string: ~4 characters per token,
/// rounded up. Stands in for a real tokenizer.
fn estimate_tokens(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }
    (text.chars().count() as u64).div_ceil(4).max(1)
}

/// Estimate `prompt_tokens` for a chat completions request body. Returns
/// `None` if `messages` is missing or malformed rather than failing.
pub fn count_chat_prompt_tokens(body: &Value) -> Option<u64> {
    let messages = body.get("messages")?.as_array()?;
    let mut total = REPLY_PRIMING_TOKENS;
    for message in messages {
        total += TOKENS_PER_MESSAGE;
        if let Some(content) = message.get("content").and_then(Value::as_str) {
            total += estimate_tokens(content);
        }
        if message.get("name").and_then(Value::as_str).is_some() {
            total += TOKENS_PER_NAME;
        }
    }
    Some(total)
}

/// Estimate `prompt_tokens` for a text completions request body.
pub fn count_completion_prompt_tokens(body: &Value) -> Option<u64> {
    let prompt = body.get("prompt")?.as_str()?;
    Some(estimate_tokens(prompt))
}
