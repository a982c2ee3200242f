//! Recovery of a JSON object from free-form model output.
//!
//! Models are asked for bare JSON but regularly wrap it in a fenced code block
//! or emit LaTeX with single backslashes, which JSON rejects. The helpers here
//! undo both before handing the text to `serde_json`.
//!
//! The backslash pass is a heuristic: JSON escapes such as `\n` or `\u00e9`
//! are doubled as well, and an intended `\\` cannot be told apart from a
//! coincidental one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("fenced block pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("no JSON object found in response")]
    NoJson,
    #[error("invalid JSON after repair: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Returns the JSON candidate inside `text`.
///
/// A fenced code block wins; otherwise the span from the first `{` to the
/// last `}` is used.
pub fn extract_json_text(text: &str) -> Result<&str, RepairError> {
    if let Some(inner) = FENCED_BLOCK.captures(text).and_then(|caps| caps.get(1)) {
        return Ok(inner.as_str().trim());
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => Err(RepairError::NoJson),
    }
}

/// Doubles every single backslash that introduces a letter, e.g. `\frac`
/// becomes `\\frac`. Backslashes that follow another backslash are kept.
pub fn repair_latex_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '\\'
            && prev != Some('\\')
            && chars.peek().is_some_and(|next| next.is_ascii_alphabetic())
        {
            out.push('\\');
        }
        prev = Some(ch);
    }

    out
}

pub fn parse_ai_response<T: DeserializeOwned>(text: &str) -> Result<T, RepairError> {
    let candidate = extract_json_text(text)?;
    let repaired = repair_latex_escapes(candidate);
    Ok(serde_json::from_str(&repaired)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Extraction, Solution};

    #[test]
    fn extracts_fenced_block() {
        let text = "Here you go:\n```json\n{\"title\": \"Exam\"}\n```\nGood luck";
        assert_eq!(extract_json_text(text).unwrap(), "{\"title\": \"Exam\"}");
    }

    #[test]
    fn extracts_untagged_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_text(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn falls_back_to_outer_braces() {
        let text = "Result: {\"a\": {\"b\": 2}} -- done";
        assert_eq!(extract_json_text(text).unwrap(), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn missing_object_is_an_error() {
        assert!(matches!(
            extract_json_text("no braces here"),
            Err(RepairError::NoJson)
        ));
        assert!(matches!(extract_json_text("} backwards {"), Err(RepairError::NoJson)));
    }

    #[test]
    fn single_backslash_is_doubled() {
        assert_eq!(repair_latex_escapes(r"\frac"), r"\\frac");
        assert_eq!(repair_latex_escapes(r"$\sqrt{x}$"), r"$\\sqrt{x}$");
    }

    #[test]
    fn doubled_backslash_is_kept() {
        assert_eq!(repair_latex_escapes(r"\\frac"), r"\\frac");
        assert_eq!(repair_latex_escapes(r"$\\pm\\sqrt{3}$"), r"$\\pm\\sqrt{3}$");
    }

    #[test]
    fn adjacent_commands_are_all_doubled() {
        assert_eq!(repair_latex_escapes(r"x\a\b"), r"x\\a\\b");
    }

    #[test]
    fn non_letter_escapes_are_untouched() {
        assert_eq!(repair_latex_escapes(r#"say \"hi\""#), r#"say \"hi\""#);
        assert_eq!(repair_latex_escapes(r"a\{b\}"), r"a\{b\}");
    }

    #[test]
    fn parses_solution_with_single_escaped_latex() {
        let raw = "```json\n{\"steps\": [{\"number\": 1, \"content\": \"$\\frac{1}{2}$\"}]}\n```";
        let solution: Solution = parse_ai_response(raw).unwrap();
        assert_eq!(solution.steps.len(), 1);
        assert_eq!(solution.steps[0].content, r"$\frac{1}{2}$");
    }

    #[test]
    fn parses_extraction_without_fence() {
        let raw = "Sure! {\"title\": \"Midterm\", \"date\": \"2026-11-17\"}";
        let extraction: Extraction = parse_ai_response(raw).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("Midterm"));
        assert_eq!(extraction.date.as_deref(), Some("2026-11-17"));
    }

    #[test]
    fn garbage_inside_braces_is_invalid() {
        let result: Result<Solution, _> = parse_ai_response("{not json at all}");
        assert!(matches!(result, Err(RepairError::Invalid(_))));
    }
}
