use regex::Regex;
use std::sync::LazyLock;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+#.\-]*[ \t]*\r?\n").expect("valid opening fence pattern"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n```[ \t]*$").expect("valid closing fence pattern"));

/// Strip one leading and one trailing markdown code fence, then trim.
///
/// Best effort only: a response holding several fenced blocks keeps everything
/// between the first opening and the last closing fence.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    let text = OPENING_FENCE.replace(text, "");
    let text = CLOSING_FENCE.replace(&text, "");
    text.trim().to_string()
}
