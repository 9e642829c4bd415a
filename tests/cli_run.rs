use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::Parser;
use kotoba_duet::cli::{Cli, run};
use kotoba_duet::error::LLMError;
use kotoba_duet::http::{DynHttpTransport, HttpRequest, HttpResponse, HttpTransport};
use kotoba_duet::{Credentials, ModelConfig};

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("kotoba-duet").chain(args.iter().copied()))
        .expect("arguments should parse")
}

fn no_keys(configs: &[ModelConfig]) -> Credentials {
    Credentials::from_lookup(configs, |_| None)
}

fn only_openai_key(configs: &[ModelConfig]) -> Credentials {
    Credentials::from_lookup(configs, |name| {
        (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
    })
}

fn all_keys(configs: &[ModelConfig]) -> Credentials {
    Credentials::from_lookup(configs, |name| Some(format!("key-for-{name}")))
}

/// The run must finish before any transport is needed.
fn no_transport() -> Result<DynHttpTransport, LLMError> {
    panic!("transport must not be built on this path");
}

/// Answers each vendor endpoint with a canned completion and records every request.
#[derive(Default)]
struct VendorStub {
    requests: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl HttpTransport for VendorStub {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError> {
        let body = if request.url.ends_with("/v1/chat/completions") {
            r#"{"choices":[{"message":{"role":"assistant","content":"answer from gpt"}}]}"#
        } else if request.url.ends_with("/v1/messages") {
            r#"{"content":[{"type":"text","text":"answer from claude"}]}"#
        } else {
            return Err(LLMError::transport(format!("unexpected url {}", request.url)));
        };
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        })
    }
}

async fn run_to_string<C>(cli: Cli, credentials: C) -> (anyhow::Result<()>, String)
where
    C: FnOnce(&[ModelConfig]) -> Credentials,
{
    let mut out = Vec::new();
    let result = run(cli, credentials, no_transport, &mut out).await;
    (result, String::from_utf8(out).expect("output is UTF-8"))
}

#[tokio::test]
async fn missing_query_prints_usage_even_without_keys() {
    let (result, out) = run_to_string(cli(&[]), no_keys).await;

    result.expect("usage is not an error");
    assert!(out.contains("Usage:"), "{out}");
    assert!(out.contains("--dir"), "{out}");
    assert!(!out.contains("環境変数"), "{out}");
}

#[tokio::test]
async fn missing_keys_are_listed_and_exit_cleanly() {
    let (result, out) = run_to_string(cli(&["What is Rust?"]), no_keys).await;

    result.expect("missing keys end the run successfully");
    assert!(
        out.contains("missing environment variables: OPENAI_API_KEY, ANTHROPIC_API_KEY"),
        "{out}"
    );
}

#[tokio::test]
async fn partially_missing_keys_name_only_the_absent_variable() {
    let (result, out) = run_to_string(cli(&["What is Rust?"]), only_openai_key).await;

    result.expect("missing keys end the run successfully");
    assert!(out.trim_end().ends_with(": ANTHROPIC_API_KEY"), "{out}");
}

#[tokio::test]
async fn unreadable_context_dir_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    let missing_arg = missing.to_str().expect("utf-8 temp path");

    let (result, out) = run_to_string(cli(&["-d", missing_arg, "Summarize"]), all_keys).await;

    let err = result.expect_err("walk failure must abort the run");
    assert!(
        err.to_string().starts_with("failed to read context directory"),
        "{err:#}"
    );
    assert!(out.contains("loading context"), "{out}");
    assert!(!out.contains("🤖"), "{out}");
}

#[tokio::test]
async fn answers_are_printed_in_configured_order_with_context_in_prompt() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("notes.md"), "ownership rules").expect("write notes");
    let dir_arg = dir.path().to_str().expect("utf-8 temp path").to_string();

    let stub = Arc::new(VendorStub::default());
    let transport: DynHttpTransport = stub.clone();
    let mut out = Vec::new();
    run(
        cli(&["--dir", &dir_arg, "Explain borrowing"]),
        all_keys,
        move || Ok(transport),
        &mut out,
    )
    .await
    .expect("run succeeds");
    let out = String::from_utf8(out).expect("output is UTF-8");

    assert!(out.contains("loaded 1 files"), "{out}");
    let gpt = out.find("🤖 GPT-4o").expect("GPT block");
    let claude = out.find("🤖 Claude Sonnet 4.5").expect("Claude block");
    assert!(gpt < claude, "{out}");
    assert!(out.contains("answer from gpt"));
    assert!(out.contains("answer from claude"));

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests.iter() {
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("ownership rules"), "{body}");
        assert!(body.contains("Explain borrowing"), "{body}");
    }
}
