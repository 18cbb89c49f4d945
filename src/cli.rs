use clap::Parser;

use crate::config::Overrides;

const AFTER_HELP: &str = "\
Examples:
  Direct query:
    chat-agent 'How are you?'
  Using the flag:
    chat-agent --ques 'Explain Rust ownership'
  Pipe a file name to send its contents along:
    echo 'config.json' | chat-agent -q 'Analyze this file'
  Pipe the whole query:
    cat question.txt | chat-agent

Configuration:
  Settings are read from config.json next to the executable
  (override with CHAT_AGENT_CONFIG). The first run asks for them
  interactively and exits.";

#[derive(Debug, Parser)]
#[command(name = "chat-agent", version)]
#[command(
    about = "Send a question to a hosted chat model and stream the answer",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Query text; piped input or a piped file name is appended to it
    #[arg(short = 'q', long = "ques", value_name = "TEXT")]
    pub question: Option<String>,

    /// API key for this run (overrides the configuration file)
    #[arg(short = 'k', long = "key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Provider for this run: deepseek, chatgpt or grok
    #[arg(short, long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Model for this run
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Query words, joined with spaces when --ques is not given
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
        }
    }
}
