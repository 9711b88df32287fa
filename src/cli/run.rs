use futures::StreamExt;
use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::args::Args;
use crate::{
    agent::{AgentService, CompletionResult},
    core::{Config, LLMError, ServiceOptions},
    providers::{
        claude::types::{DeltaEvent, StopReason, StreamEvent, Usage},
        EventStream, Message,
    },
    tools::ToolDefinition,
};

pub async fn run(args: Args) -> Result<(), LLMError> {
    let config = Config::load()?;
    let options = ServiceOptions::from_env()?;

    let system = args.system.or_else(|| config.system_prompt.clone());
    debug!(
        "[SETTINGS] model: {}, stream: {}, system prompt: {}",
        config.model,
        args.stream,
        system.is_some()
    );

    let service = AgentService::new(options, config);
    let mut stdout = io::stdout();

    if let Some(path) = args.tools {
        let tools: Vec<ToolDefinition> = load_json(&path)?;
        let response = service
            .generate_with_tools(&args.prompt, &tools, system.as_deref())
            .await?;
        writeln!(stdout, "{}", serde_json::to_string_pretty(&response)?)?;
        return Ok(());
    }

    if args.stream {
        let stream = service
            .stream_completion(&args.prompt, system.as_deref())
            .await?;
        let result = write_stream(stream, &mut stdout).await?;
        // Ensure final newline
        writeln!(stdout)?;
        report_usage(&result);
        return Ok(());
    }

    let result = match args.history {
        Some(path) => {
            let history: Vec<Message> = load_json(&path)?;
            service
                .generate_from_history(&history, &args.prompt, system.as_deref())
                .await?
        }
        None => service.generate(&args.prompt, system.as_deref()).await?,
    };

    writeln!(stdout, "{}", result.text)?;
    report_usage(&result);
    Ok(())
}

/// Writes text deltas as they arrive and tallies usage from the
/// `message_start` and `message_delta` events. Ctrl-C cancels the stream.
async fn write_stream<W: Write>(
    mut stream: EventStream,
    writer: &mut W,
) -> Result<CompletionResult, LLMError> {
    let mut result = CompletionResult {
        text: String::new(),
        usage: Usage::default(),
        stop_reason: None,
    };

    loop {
        let next = tokio::select! {
            event = stream.next() => Some(event),
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(event) = next else {
            debug!("[Stream] interrupted");
            stream.cancel();
            break;
        };
        let Some(event) = event else {
            break;
        };

        match event? {
            StreamEvent::MessageStart { message } => {
                result.usage.input_tokens = message.usage.input_tokens;
            }
            StreamEvent::ContentBlockDelta {
                delta: DeltaEvent::TextDelta { text },
                ..
            } => {
                write!(writer, "{text}")?;
                writer.flush()?;
                result.text.push_str(&text);
            }
            StreamEvent::MessageDelta { delta, usage } => {
                result.stop_reason = delta.stop_reason;
                if let Some(usage) = usage {
                    result.usage.output_tokens = usage.output_tokens;
                }
            }
            _ => {}
        }
    }

    Ok(result)
}

fn report_usage(result: &CompletionResult) {
    let stop = result.stop_reason.as_ref().map_or("none", StopReason::as_str);
    eprintln!(
        "[usage] input: {} output: {} stop: {stop}",
        result.usage.input_tokens, result.usage.output_tokens
    );
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LLMError> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| LLMError::Validation(format!("Failed to parse {}: {e}", path.display())))
}
