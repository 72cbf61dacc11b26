// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use ensemble_graph::adapter::EnsembleTranslatorFactory;
use ensemble_graph::backends::local::LocalModelPool;
use ensemble_graph::config::{load_config, EnsembleConfig};
use ensemble_graph::envelope::{Envelope, Payload};

struct CliArgs {
    model_dir: PathBuf,
    input_text: String,
    config_file: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut positional = Vec::new();
    let mut config_file = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().context("--config needs a file argument")?;
            config_file = Some(PathBuf::from(path));
        } else {
            positional.push(arg.clone());
        }
    }

    if positional.len() != 2 {
        bail!("expected <model_dir> and <input_text>");
    }
    let input_text = positional.pop().unwrap_or_default();
    let model_dir = PathBuf::from(positional.pop().unwrap_or_default());
    Ok(CliArgs {
        model_dir,
        input_text,
        config_file,
    })
}

fn print_envelope(output: &Envelope) {
    println!("Status: {} {}", output.code(), output.message());
    for (key, payload) in output.content() {
        match payload {
            Payload::Tensors(list) => println!("  {}: <{} tensors>", key, list.len()),
            Payload::Bytes(bytes) => match payload.as_text() {
                Some(text) => println!("  {}: {}", key, text),
                None => println!("  {}: <{} bytes>", key, bytes.len()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: {} <model_dir> <input_text> [--config <file>]", args[0]);
            eprintln!("Example: {} demos/text_pipeline \"hello world\"", args[0]);
            std::process::exit(1);
        }
    };

    let config = match &cli.config_file {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EnsembleConfig::default(),
    };

    let factory = EnsembleTranslatorFactory::from_config(&config)?;
    let translator = factory
        .new_instance(&cli.model_dir, tokio::runtime::Handle::current())
        .with_context(|| format!("failed to load ensemble from {}", cli.model_dir.display()))?;

    println!("Model dir: {}", cli.model_dir.display());
    println!("Input: \"{}\"", cli.input_text);

    let start = Instant::now();
    let input = Envelope::new().with_entry("data", cli.input_text);
    // the translator blocks until evaluation finishes, so keep it off the runtime workers
    let output = tokio::task::spawn_blocking(move || {
        let ctx = translator.new_context(Arc::new(LocalModelPool::with_builtins()));
        translator.process_input(&ctx, input)?;
        translator.process_output(&ctx)
    })
    .await??;

    print_envelope(&output);
    println!("Completed in {:?}", start.elapsed());
    Ok(())
}
