//! Model Output Sanitizer
//!
//! Deterministic cleanup of raw LLM text: conversational preambles,
//! greeting fillers, markdown artifacts, list numbering, and whitespace.
//! Every generation stage runs its provider output through here before
//! using it.
//!
//! The functions are total and idempotent: they never fail, and a second
//! application returns the input unchanged. If cleanup removes all
//! content, the empty string is returned as-is; callers treat that as a
//! stage failure signal rather than falling back to the raw text.

use std::sync::LazyLock;

use regex::Regex;

/// A single "meta" line at the very start of the text, e.g. "here is the
/// summary" or "다음은 생성된 리뷰입니다".
static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:here (?:is|are)|below (?:is|are)|the following (?:is|are)|다음은|생성된|제목:|섹션:|목차:)[^\n]*\n?",
    )
    .expect("meta-line pattern is valid")
});

/// Line-initial greeting/filler tokens, repeated so a stack of openers
/// ("네, 안녕하세요 ...") is removed in one match.
static OPENERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:(?:네,|안녕하세요|오늘은|여러분|그럼|자,|음,)\s*)+")
        .expect("opener pattern is valid")
});

/// Whole announcement lines: "…을 소개해 드리겠습니다", "…을 설명하겠습니다" etc.
static ANNOUNCEMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\n]{0,80}(?:소개|설명|추천|알아보)(?:해 ?드리)?겠습니다[^\n]*\n?")
        .expect("announcement pattern is valid")
});

/// Markdown heading markers at line start
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s*").expect("heading pattern is valid"));

/// Numbered or bulleted list prefixes at line start, repeated to strip
/// stacked enumerators in one match
static LIST_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:\d+[.)]\s*|-\s+)+").expect("list-prefix pattern is valid")
});

/// Bold spans, protected from the italic strip
static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*\n]+\*\*").expect("bold pattern is valid"));

/// Single-asterisk italic spans (matched only outside bold spans)
static ITALIC_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").expect("italic pattern is valid"));

/// Three or more consecutive newlines
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern is valid"));

/// Clean conversational and markdown artifacts out of raw model text.
///
/// Keeps single-asterisk italics intact; use [`sanitize_body`] for the
/// outline/body variant that also strips them.
pub fn sanitize(text: &str) -> String {
    run_to_fixpoint(text, false)
}

/// [`sanitize`] plus single-asterisk italic removal, preserving
/// `**bold**` spans. Used for outline titles, section bodies, and the
/// final assembled document.
pub fn sanitize_body(text: &str) -> String {
    run_to_fixpoint(text, true)
}

/// Cleanup passes can expose new artifacts (a stripped bullet revealing a
/// greeting, a removed greeting revealing a meta line), so the pass
/// sequence repeats until the text stops changing. Every pass only removes
/// characters, so a changed pass strictly shrinks the text and the loop
/// terminates.
fn run_to_fixpoint(text: &str, strip_italics: bool) -> String {
    let mut current = text.to_string();
    loop {
        let next = sanitize_pass(&current, strip_italics);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn sanitize_pass(text: &str, strip_italics: bool) -> String {
    // Leading meta lines, only at the very start
    let mut out = text.trim_start().to_string();
    while let Some(m) = META_LINE.find(&out) {
        if m.start() != 0 {
            break;
        }
        out.replace_range(..m.end(), "");
    }

    let out = OPENERS.replace_all(&out, "");
    let out = ANNOUNCEMENT_LINE.replace_all(&out, "");
    let out = HEADING.replace_all(&out, "");
    let out = LIST_PREFIX.replace_all(&out, "");

    let out = if strip_italics {
        strip_italics_preserving_bold(&out)
    } else {
        out.into_owned()
    };

    let out = EXCESS_NEWLINES.replace_all(&out, "\n\n");
    out.trim().to_string()
}

/// Remove `*italic*` spans while leaving `**bold**` untouched.
///
/// The regex crate has no lookaround, so bold spans are located first and
/// the italic strip runs only on the gaps between them.
fn strip_italics_preserving_bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in BOLD_SPAN.find_iter(text) {
        out.push_str(&ITALIC_SPAN.replace_all(&text[last..span.start()], "$1"));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&ITALIC_SPAN.replace_all(&text[last..], "$1"));
    out
}
