//! Proxy Chat CLI - chat with OpenAI models through an API gateway
//!
//! Usage:
//!     proxy-chat [OPTIONS] [PROMPT]
//!
//! Environment Variables:
//!     PROXY_API_KEY: Gateway API key (required)
//!     PROXY_VIRTUAL_KEY: Gateway virtual key (required)
//!     PROXY_BASE_URL: Gateway base URL (used when --proxy-url is not given)
//!     PROXY_CHAT_MODEL: Model name (default: gpt-4o)
//!     PROXY_CHAT_MAX_TOKENS: Maximum tokens per reply (default: 1024)
//!     PROXY_CHAT_SESSION: Session label for log correlation

use anyhow::Result;
use clap::Parser;
use proxy_chat::{
    create_proxy_openai_chat, AssistantChat, ChatClient, LlmConfig, ProxyChatOpenAI,
};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Proxy Chat - OpenAI chat through an API gateway
#[derive(Parser, Debug)]
#[command(name = "proxy-chat")]
#[command(about = "Proxy Chat - OpenAI chat through an API gateway")]
#[command(after_help = r#"Examples:
    # Interactive session against the gateway in PROXY_BASE_URL
    proxy-chat

    # Specify the gateway endpoint
    proxy-chat --proxy-url https://gateway.example/v1

    # Check gateway connectivity
    proxy-chat --check

    # Print the client description and exit
    proxy-chat --describe

    # Ask a single question
    proxy-chat "Summarize the plot of Hamlet in one sentence"
"#)]
struct Cli {
    /// Model name
    #[arg(long, env = "PROXY_CHAT_MODEL", default_value = "gpt-4o")]
    model: String,

    /// Maximum tokens per reply
    #[arg(long, env = "PROXY_CHAT_MAX_TOKENS", default_value = "1024")]
    max_tokens: u32,

    /// Gateway base URL (overrides PROXY_BASE_URL)
    #[arg(long)]
    proxy_url: Option<String>,

    /// Session label for log correlation (random if omitted)
    #[arg(long, env = "PROXY_CHAT_SESSION")]
    session: Option<String>,

    /// System prompt for the conversation
    #[arg(long)]
    system: Option<String>,

    /// Print the client description as JSON and exit
    #[arg(long)]
    describe: bool,

    /// Send a test request to the gateway and exit
    #[arg(long)]
    check: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Prompt to send (interactive mode if not provided)
    prompt: Option<String>,
}

/// Install the tracing subscriber; RUST_LOG wins over the defaults
fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_target(false)
        .init();
}

/// Check gateway connectivity with a minimal request
async fn check_model_api(client: &ChatClient) -> bool {
    println!("\u{1F50D} Checking model API...");
    println!("{}", "-".repeat(50));

    print!("1. Checking API connectivity ({})... ", client.base_url());
    io::stdout().flush().ok();

    match client.test_connection().await {
        Ok(_) => {
            println!("\u{2705} OK");
            println!("{}", "-".repeat(50));
            println!("\u{2705} Model API checks passed!\n");
            true
        }
        Err(e) => {
            println!("\u{274C} FAILED");
            let error_msg = e.to_string();

            if error_msg.contains("401") || error_msg.to_lowercase().contains("unauthorized") {
                println!("   Error: The gateway rejected the credentials");
                println!("   Solution:");
                println!("     1. Verify PROXY_API_KEY");
                println!("     2. Verify PROXY_VIRTUAL_KEY maps to an OpenAI key");
            } else if error_msg.to_lowercase().contains("timeout") {
                println!("   Error: Connection to {} timed out", client.base_url());
                println!("   Solution:");
                println!("     1. Check your network connection");
                println!("     2. Verify the gateway is responding");
            } else {
                println!("   Error: {}", error_msg);
            }

            println!("{}", "-".repeat(50));
            println!("\u{274C} Model API check failed. Please fix the issues above.");
            false
        }
    }
}

/// Print application header
fn print_header(chat: &ProxyChatOpenAI) {
    println!("{}", "=".repeat(50));
    println!("Proxy Chat - OpenAI chat through an API gateway");
    println!("{}", "=".repeat(50));
    println!("Model: {}", chat.model_name());
    println!("Base URL: {}", chat.base_url());
    println!("Max Tokens: {}", chat.max_tokens());
    println!("Session: {}", chat.session_name());
    println!("{}", "=".repeat(50));
}

/// Run interactive mode
async fn run_interactive_mode(chat: &mut ProxyChatOpenAI) -> Result<()> {
    println!("\nEntering interactive mode. Type 'quit' to exit, '/reset' to start over.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(_) => {
                println!("\n\nInterrupted. Goodbye!");
                break;
            }
        }

        let message = input.trim();

        if message.eq_ignore_ascii_case("quit")
            || message.eq_ignore_ascii_case("exit")
            || message.eq_ignore_ascii_case("q")
        {
            println!("Goodbye!");
            break;
        }

        if message == "/reset" {
            chat.reset();
            println!("Conversation reset.\n");
            continue;
        }

        if message.is_empty() {
            continue;
        }

        match chat.assistant_chat(message).await {
            Ok(reply) => println!("\nAssistant: {}\n", reply),
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    let usage = chat.conversation().usage();
    println!(
        "Session {}: {} turn(s), {} tokens",
        chat.session_name(),
        chat.conversation().turns(),
        usage.total_tokens
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    init_logging(args.quiet);

    let mut config = LlmConfig::new(&args.model, args.max_tokens);
    if let Some(proxy_url) = &args.proxy_url {
        config = config.with_proxy_url(proxy_url);
    }

    let session = args
        .session
        .clone()
        .unwrap_or_else(|| format!("cli-{}", Uuid::new_v4()));

    let mut chat = match create_proxy_openai_chat(&config, &session) {
        Ok(chat) => chat,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(system) = &args.system {
        chat = chat.with_system_prompt(system);
    }

    if args.describe {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(chat.describe()))?
        );
        return Ok(());
    }

    if args.check {
        if !check_model_api(chat.client()).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    print_header(&chat);

    // Run with provided prompt or enter interactive mode
    if let Some(prompt) = &args.prompt {
        let reply = chat.assistant_chat(prompt).await?;
        println!("\n{}", reply);
    } else {
        run_interactive_mode(&mut chat).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["proxy-chat"]).unwrap();

        assert_eq!(cli.max_tokens, 1024);
        assert!(cli.proxy_url.is_none());
        assert!(cli.prompt.is_none());
        assert!(!cli.describe);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "proxy-chat",
            "--model",
            "gpt-4o-mini",
            "--max-tokens",
            "256",
            "--proxy-url",
            "https://gw/v1",
            "--session",
            "sess-1",
            "--describe",
            "hello",
        ])
        .unwrap();

        assert_eq!(cli.model, "gpt-4o-mini");
        assert_eq!(cli.max_tokens, 256);
        assert_eq!(cli.proxy_url.as_deref(), Some("https://gw/v1"));
        assert_eq!(cli.session.as_deref(), Some("sess-1"));
        assert!(cli.describe);
        assert_eq!(cli.prompt.as_deref(), Some("hello"));
    }
}
