//! Command-line surface: argument definitions and the startup flow behind `main`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use crate::config::{Credentials, ModelConfig, build_dispatcher, default_configs};
use crate::context::ContextLoader;
use crate::error::LLMError;
use crate::http::DynHttpTransport;
use crate::prompt::build_prompt;
use crate::render::render_results;

#[derive(Debug, Parser)]
#[command(name = "kotoba-duet")]
#[command(about = "Ask GPT and Claude the same question and compare the answers")]
#[command(version)]
pub struct Cli {
    /// Directory whose text files are prepended to the prompt as reference material
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Question sent to every provider
    pub query: Option<String>,
}

/// Runs one question end to end and writes everything user-facing to `out`.
///
/// Startup checks happen in this order, and none of them touches the network:
///
/// 1. no query: usage is written and the run ends successfully;
/// 2. missing API keys: every missing variable is listed and the run ends successfully;
/// 3. `--dir` given: the directory is loaded, and a failed walk aborts with an error.
///
/// Only then is `connect` called to obtain the transport shared by every provider.
pub async fn run<C, T, W>(
    cli: Cli,
    credentials: C,
    connect: T,
    out: &mut W,
) -> anyhow::Result<()>
where
    C: FnOnce(&[ModelConfig]) -> Credentials,
    T: FnOnce() -> Result<DynHttpTransport, LLMError>,
    W: Write,
{
    let Some(query) = cli.query else {
        write!(out, "{}", Cli::command().render_help())?;
        return Ok(());
    };

    let configs = default_configs();
    let credentials = credentials(&configs);
    let missing = credentials.missing(&configs);
    if !missing.is_empty() {
        writeln!(
            out,
            "Error: 環境変数が設定されていません / missing environment variables: {}",
            missing.join(", ")
        )?;
        return Ok(());
    }

    let context = match &cli.dir {
        Some(dir) => {
            writeln!(
                out,
                "フォルダ '{}' を読み込んでいます... (loading context)",
                dir.display()
            )?;
            let loaded = ContextLoader::new()
                .load(dir)
                .with_context(|| format!("failed to read context directory {}", dir.display()))?;
            writeln!(
                out,
                "読み込み完了 / loaded {} files ({} characters)",
                loaded.files.len(),
                loaded.text.chars().count()
            )?;
            Some(loaded.text)
        }
        None => None,
    };

    let prompt = build_prompt(&query, context.as_deref());
    let dispatcher = build_dispatcher(&configs, &credentials, connect()?)?;
    let results = dispatcher.dispatch(prompt).await;

    render_results(out, &results)?;
    out.flush()?;
    Ok(())
}
