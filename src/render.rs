use std::io::{self, Write};

use crate::dispatch::ModelResult;

const HEAVY_RULE: &str = "==========================================";
const LIGHT_RULE: &str = "------------------------------------------";

/// Formats one result as a bordered block.
///
/// The body is the error text, an empty-response warning, or the response itself.
pub fn render_result(result: &ModelResult) -> String {
    let body = match &result.error {
        Some(err) => format!("❌ Error: {err}"),
        None if result.content.is_empty() => {
            "⚠️ Warning: 回答が空です (empty response)".to_string()
        }
        None => result.content.clone(),
    };
    format!(
        "\n{HEAVY_RULE}\n🤖 {} (Time: {:.2?})\n{LIGHT_RULE}\n{body}\n{HEAVY_RULE}\n",
        result.name, result.duration
    )
}

/// Writes every result in slice order.
pub fn render_results<W: Write>(writer: &mut W, results: &[ModelResult]) -> io::Result<()> {
    for result in results {
        writer.write_all(render_result(result).as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::LLMError;

    fn result(name: &str, outcome: Result<String, LLMError>) -> ModelResult {
        ModelResult::new(name, outcome, Duration::from_millis(1500))
    }

    #[test]
    fn success_block_contains_label_time_and_text() {
        let block = render_result(&result("GPT-4o", Ok("Rust is fast.".into())));
        assert!(block.contains("🤖 GPT-4o (Time: 1.50s)"), "{block}");
        assert!(block.contains("Rust is fast."));
        assert!(block.starts_with('\n'));
        assert!(block.ends_with(&format!("{HEAVY_RULE}\n")));
    }

    #[test]
    fn empty_success_and_error_render_differently() {
        let empty = render_result(&result("a", Ok(String::new())));
        let failed = render_result(&result("a", Err(LLMError::transport("refused"))));

        assert!(empty.contains("⚠️ Warning"));
        assert!(!empty.contains("❌"));
        assert!(failed.contains("❌ Error: transport error: refused"));
        assert!(!failed.contains("⚠️"));
    }

    #[test]
    fn render_results_keeps_slice_order() {
        let results = vec![
            result("first", Ok("1".into())),
            result("second", Ok("2".into())),
        ];
        let mut out = Vec::new();
        render_results(&mut out, &results).expect("write");
        let text = String::from_utf8(out).expect("utf8");

        let first = text.find("🤖 first").expect("first block");
        let second = text.find("🤖 second").expect("second block");
        assert!(first < second);
    }
}
