use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Prompt to send to the model
    #[arg()]
    pub prompt: String,

    /// System prompt (defaults to `system_prompt` from config.toml)
    #[arg(short, long)]
    pub system: Option<String>,

    /// Print text as it is generated
    #[arg(long, conflicts_with_all = ["history", "tools"])]
    pub stream: bool,

    /// JSON file with earlier conversation turns to send before the prompt
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// JSON file with tool definitions; prints the raw response
    #[arg(long, value_name = "FILE", conflicts_with = "history")]
    pub tools: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value = "false")]
    pub debug: bool,
}
