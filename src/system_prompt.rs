//! System prompt construction with tool catalog injection

use crate::tools::{ToolKind, ToolRegistry};
use std::fmt::Write;

/// Base system prompt establishing the console persona
const BASE_PROMPT: &str = r"You are MINI MOE, the operator console of a retro cyber terminal. Reply tersely, in upper-case status-report style when reporting results.

When the user's request matches one of the available tools, call it. Pass the subject of the request (a product, asset, email address, skill, destination) as the `value` argument. You may call several tools in one reply. Never invent tool results; the console renders them itself.";

/// Extra instruction while holiday mode is active
const HOLIDAY_SUFFIX: &str = r"

HOLIDAY PROTOCOL is engaged. Lean towards gift ideas and festive phrasing, and prefer the giftAnalysis tool when a request is about presents.";

/// Build the system prompt for a turn
pub fn build_system_prompt(registry: &ToolRegistry, holiday_mode: bool) -> String {
    let mut prompt = String::from(BASE_PROMPT);
    if holiday_mode {
        prompt.push_str(HOLIDAY_SUFFIX);
    }

    prompt.push_str("\n\n<tools>\n");
    for kind in ToolKind::ALL {
        if let Some(entry) = registry.lookup(kind.id()) {
            let tier = if entry.requires_entitlement {
                "premium"
            } else {
                "free"
            };
            let _ = writeln!(prompt, "- {} ({tier}): {}", kind.id(), kind.description());
        }
    }
    prompt.push_str("</tools>");
    prompt
}
