/// Builds the text sent to every provider.
///
/// Without context (or with an empty one) the query is sent as-is. Otherwise the
/// context is wrapped in a fixed Japanese/English instruction template followed by
/// the query.
///
/// # Examples
///
/// ```
/// use kotoba_duet::prompt::build_prompt;
///
/// assert_eq!(build_prompt("What is Rust?", None), "What is Rust?");
///
/// let prompt = build_prompt("Summarize", Some("--- File: a.md ---\nhello"));
/// assert!(prompt.contains("hello"));
/// assert!(prompt.ends_with("Summarize"));
/// ```
pub fn build_prompt(query: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!(
            "以下の【参考資料】を前提知識として、ユーザーの質問に答えてください。\n\
             Answer the user's question using the reference material below as background knowledge.\n\n\
             【参考資料 / Reference material】\n{context}\n\n\
             【ユーザーの質問 / User question】\n{query}"
        ),
        _ => query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_sends_raw_query() {
        assert_eq!(build_prompt("hi", Some("")), "hi");
    }

    #[test]
    fn context_precedes_query() {
        let prompt = build_prompt("Q?", Some("CTX"));
        let context_at = prompt.find("CTX").expect("context present");
        let query_at = prompt.rfind("Q?").expect("query present");
        assert!(context_at < query_at);
        assert!(prompt.starts_with("以下の【参考資料】"));
        assert!(prompt.contains("Reference material"));
    }
}
