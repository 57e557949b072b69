mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use huddle_api::ChatApi;
use huddle_config::load as load_config;
use huddle_runtime::{telemetry, ClientServices};
use huddle_session::{SessionError, SessionHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use render::{channel_line, ViewPrinter};

#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "Huddle chat client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and print the session token
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List the channels visible to the current user
    Channels {
        #[arg(long, env = "HUDDLE_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Join a channel and chat interactively
    Chat {
        #[arg(long)]
        channel: String,
        #[arg(long, env = "HUDDLE_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;
    let services = ClientServices::initialise(&config)
        .await
        .context("failed to initialise client services")?;

    match cli.command {
        Commands::Login { email, password } => {
            let auth = services.login(&email, &password).await?;
            println!("Logged in as {}", auth.user.username);
            println!("export HUDDLE_TOKEN={}", auth.token);
            Ok(())
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let auth = services.register(&username, &email, &password).await?;
            println!("Registered {}", auth.user.username);
            println!("export HUDDLE_TOKEN={}", auth.token);
            Ok(())
        }
        Commands::Channels { token } => list_channels(&services, &token).await,
        Commands::Chat { channel, token } => run_chat(&services, &token, &channel).await,
    }
}

async fn list_channels(services: &ClientServices, token: &str) -> anyhow::Result<()> {
    services.resume(token).await?;
    let channels = services
        .authorized(token)
        .list_channels()
        .await
        .context("failed to list channels")?;

    if channels.is_empty() {
        println!("No channels yet");
        return Ok(());
    }
    println!("{:<26} {:<24} {:<8} {}", "ID", "Name", "Access", "Members");
    println!("{}", "-".repeat(72));
    for channel in &channels {
        println!("{}", channel_line(channel));
    }
    Ok(())
}

async fn run_chat(services: &ClientServices, token: &str, channel_id: &str) -> anyhow::Result<()> {
    let context = services
        .resume(token)
        .await?
        .on_logout(|| info!("session closed"));
    let session = services.start_session(context)?;

    let printer = tokio::spawn(print_views(session.clone()));

    session
        .select_channel(channel_id)
        .await
        .with_context(|| format!("failed to open channel {channel_id}"))?;

    println!("Type a message and press enter. Commands: /more, /leave, /quit");

    let result = tokio::select! {
        result = read_input(&session) => result,
        _ = huddle_runtime::shutdown_signal() => Ok(()),
    };

    if let Err(error) = session.logout().await {
        warn!(%error, "session already closed");
    }
    printer.abort();
    result
}

async fn read_input(session: &SessionHandle) -> anyhow::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Ok(());
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/q" => return Ok(()),
            "/more" => match session.load_more().await {
                Ok(0) => println!("* no older messages"),
                Ok(added) => println!("* loaded {added} older messages"),
                Err(error) => println!("! {error}"),
            },
            "/leave" => {
                session.leave_channel().await?;
                println!("* left channel");
            }
            text => {
                session.keystroke().await?;
                match session.send_message(text).await {
                    Ok(()) => {}
                    Err(SessionError::NoChannel) => println!("! join a channel first"),
                    Err(error) => println!("! {error}"),
                }
            }
        }
    }
}

async fn print_views(session: SessionHandle) {
    let mut views = session.subscribe();
    let mut printer = ViewPrinter::new();

    loop {
        let lines = printer.lines(&views.borrow_and_update());
        for line in lines {
            println!("{line}");
        }
        if views.changed().await.is_err() {
            break;
        }
    }
}
