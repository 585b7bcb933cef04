use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use chat_relay::config::{AppConfig, ServerConfig};
use chat_relay::logging;
use chat_relay::server::{self, build_relay};
use chat_relay::services::api_client::ApiClient;
use chat_relay::services::terminal::{ChatTransport, run_chat_loop, run_smoke_test};

#[derive(Parser)]
#[command(name = "chat-relay", version, about = "AI chat service backed by Google Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Run the server in the background and send a few test messages
    ServeAndTest,
    /// Run the server in the background and chat with it from the terminal
    ServeAndChat,
    /// Chat with an already running server
    Chat {
        #[arg(long)]
        url: Option<String>,
    },
    /// Chat from the terminal without starting a server
    Local,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => match choose_from_menu().await? {
            Some(command) => command,
            None => {
                println!("Invalid choice");
                return Ok(());
            }
        },
    };

    match command {
        Command::Serve => {
            logging::init(logging::DEFAULT_FILTER);
            let config = load_config()?;
            let relay = build_relay(&config)?;
            let listener = TcpListener::bind(config.server.address())
                .await
                .with_context(|| format!("failed to bind {}", config.server.address()))?;
            println!("Starting server at {}", config.server.base_url());
            println!("Visit {} for the web interface", config.server.base_url());
            server::serve(listener, relay, server::shutdown_signal()).await?;
        }
        Command::ServeAndTest => {
            logging::init(logging::QUIET_FILTER);
            let (client, stop) = spawn_background_server(&load_config()?).await?;
            run_smoke_test(&client, &mut tokio::io::stdout()).await?;
            let _ = stop.send(());
        }
        Command::ServeAndChat => {
            logging::init(logging::QUIET_FILTER);
            let (client, stop) = spawn_background_server(&load_config()?).await?;
            chat_until_interrupted(&client).await?;
            let _ = stop.send(());
        }
        Command::Chat { url } => {
            logging::init(logging::QUIET_FILTER);
            // Client-only: the backend settings are never read here.
            let url = match url {
                Some(url) => url,
                None => ServerConfig::from_env()
                    .context("invalid configuration")?
                    .base_url(),
            };
            let client = ApiClient::new(url);
            chat_until_interrupted(&client).await?;
        }
        Command::Local => {
            logging::init(logging::QUIET_FILTER);
            let relay = build_relay(&load_config()?)?;
            chat_until_interrupted(&relay).await?;
        }
    }
    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::from_env().context("invalid configuration")
}

async fn choose_from_menu() -> anyhow::Result<Option<Command>> {
    println!("AI Chat Service");
    println!("Choose an option:");
    println!("1. Start server only");
    println!("2. Start server + test with API client");
    println!("3. Start server + interactive chat");
    println!("4. Chat with a running server");
    println!("5. Chat without a server");
    print!("\nEnter choice (1-5): ");
    use std::io::Write;
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(match line.trim() {
        "1" => Some(Command::Serve),
        "2" => Some(Command::ServeAndTest),
        "3" => Some(Command::ServeAndChat),
        "4" => Some(Command::Chat { url: None }),
        "5" => Some(Command::Local),
        _ => None,
    })
}

/// Starts the server on a task; sending on the returned channel stops it.
async fn spawn_background_server(config: &AppConfig) -> anyhow::Result<(ApiClient, oneshot::Sender<()>)> {
    let relay = build_relay(config)?;
    let listener = TcpListener::bind(config.server.address())
        .await
        .with_context(|| format!("failed to bind {}", config.server.address()))?;
    let client = ApiClient::new(format!("http://{}", listener.local_addr()?));

    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = stopped.await;
        };
        if let Err(e) = server::serve(listener, relay, shutdown).await {
            tracing::error!(error = %e, "background server failed");
        }
    });

    println!("Waiting for server to start...");
    if !client.wait_until_healthy(Duration::from_secs(5)).await {
        bail!("server at {} did not become healthy", client.base_url());
    }
    Ok((client, stop))
}

async fn chat_until_interrupted<T: ChatTransport>(transport: &T) -> anyhow::Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    tokio::select! {
        result = run_chat_loop(transport, input, &mut output) => result?,
        _ = tokio::signal::ctrl_c() => println!("\nGoodbye!"),
    }
    Ok(())
}
