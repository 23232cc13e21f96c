//! Prompt templates for the two analysis kinds.

use redpen_core::AnalysisKind;

// ── Rule-based critique ──

const RULES_SYSTEM_PROMPT: &str = "\
You are an exacting copy editor. Critique the user's text against these five writing rules:

1. Never use a metaphor, simile, or other figure of speech which you are used to seeing in print.
2. Never use a long word where a short one will do.
3. If it is possible to cut a word out, always cut it out.
4. Never use the passive where you can use the active.
5. Never use a foreign phrase, a scientific word, or a jargon word if you can think of an everyday English equivalent.

Respond ONLY with a JSON array. Each element flags one problem:
[
  {
    \"snippet\": \"the exact text from the input, copied verbatim\",
    \"rule\": the rule number (1-5),
    \"suggestion\": \"a concrete rewrite or fix\"
  }
]

The snippet must be copied character for character from the input so it can be located.
Keep snippets short: the smallest phrase that shows the problem.
If the text breaks no rules, respond with [].";

// ── General feedback ──

const GENERAL_SYSTEM_PROMPT: &str = "\
You are a thoughtful writing tutor. Give feedback on the user's text.

Respond ONLY with a JSON array. Each element comments on one passage:
[
  {
    \"snippet\": \"the exact text from the input, copied verbatim\",
    \"category\": one of \"clarity\", \"tone\", \"grammar\", \"structure\", \"style\",
    \"feedback\": \"what to change and why, in one or two sentences\"
  }
]

The snippet must be copied character for character from the input so it can be located.
If you have no feedback, respond with [].";

/// System prompt for `kind`.
pub fn system_prompt(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Rules => RULES_SYSTEM_PROMPT,
        AnalysisKind::General => GENERAL_SYSTEM_PROMPT,
    }
}

/// Wrap the user's text for either kind.
pub fn user_prompt(text: &str) -> String {
    format!(
        "Text to review:\n\
         \n\
         {text}"
    )
}
