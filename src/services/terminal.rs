// src/services/terminal.rs
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::api_client::ApiClient;
use super::relay::Relay;
use crate::message::{ChatReply, ChatRequest};

pub const SMOKE_TEST_MESSAGES: [&str; 3] = [
    "Hello! How are you today?",
    "What's 2 + 2?",
    "Tell me a fun fact about space",
];

/// Anything the terminal loop can hand a message to.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str, context: &str) -> ChatReply;
}

#[async_trait]
impl ChatTransport for Relay {
    async fn send(&self, message: &str, context: &str) -> ChatReply {
        self.respond(ChatRequest::new(message).with_context(context))
            .await
    }
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn send(&self, message: &str, context: &str) -> ChatReply {
        self.send_message(message, context).await
    }
}

enum Command<'a> {
    Quit,
    Clear,
    SetContext(&'a str),
    Skip,
    Send(&'a str),
}

fn parse_line(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Skip;
    }
    if let Some(rest) = line.strip_prefix("/context") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Command::SetContext(rest.trim());
        }
    }
    match line.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        "clear" => Command::Clear,
        _ => Command::Send(line),
    }
}

fn render_reply(reply: ChatReply) -> String {
    match reply.into_result() {
        Ok(text) => text,
        Err(err) => format!("Error: {}", err.message),
    }
}

/// Reads lines from `input` until EOF or a quit command, relaying each message.
pub async fn run_chat_loop<T, R, W>(transport: &T, input: R, output: &mut W) -> std::io::Result<()>
where
    T: ChatTransport + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(b"AI Chat Client Started!\nType 'quit' to exit, 'clear' to reset context, '/context <text>' to set it\n\n")
        .await?;

    let mut context = String::new();
    let mut lines = input.lines();
    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\nGoodbye!\n").await?;
            break;
        };

        match parse_line(&line) {
            Command::Quit => {
                output.write_all(b"Goodbye!\n").await?;
                break;
            }
            Command::Clear => {
                context.clear();
                output.write_all(b"Context cleared!\n").await?;
            }
            Command::SetContext(text) => {
                context = text.to_string();
                output.write_all(b"Context set!\n").await?;
            }
            Command::Skip => {}
            Command::Send(message) => {
                output.write_all(b"AI: ").await?;
                output.flush().await?;
                let reply = transport.send(message, &context).await;
                output
                    .write_all(format!("{}\n\n", render_reply(reply)).as_bytes())
                    .await?;
            }
        }
        output.flush().await?;
    }
    output.flush().await
}

/// Sends a fixed set of messages and prints each reply. Returns how many succeeded.
pub async fn run_smoke_test<T, W>(transport: &T, output: &mut W) -> std::io::Result<usize>
where
    T: ChatTransport + ?Sized,
    W: AsyncWrite + Unpin,
{
    output.write_all(b"Testing API client...\n").await?;
    let mut succeeded = 0;
    for message in SMOKE_TEST_MESSAGES {
        output
            .write_all(format!("\nSending: {message}\n").as_bytes())
            .await?;
        let reply = transport.send(message, "").await;
        if reply.is_success() {
            succeeded += 1;
        }
        output
            .write_all(format!("Response: {}\n", render_reply(reply)).as_bytes())
            .await?;
    }
    output
        .write_all(format!("\nAPI test completed ({succeeded}/{} ok)\n", SMOKE_TEST_MESSAGES.len()).as_bytes())
        .await?;
    output.flush().await?;
    Ok(succeeded)
}
