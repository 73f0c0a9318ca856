use std::sync::Arc;

use clap::{Parser, Subcommand};
use langchain_chatbot::{chatbot::Chatbot, config::Settings, server, Result};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI (default)
    Serve {
        /// Address to bind, overrides CHATBOT_SERVER__HOST
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides CHATBOT_SERVER__PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Answer one question and print the response as JSON
    Ask {
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::new()?;

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            let listener = server::bind(&settings.server.host, settings.server.port).await?;

            let chatbot = Arc::new(Chatbot::from_settings(&settings).await?);
            log::info!("{}", chatbot.credential_status().message());
            if settings.index.warm_on_start {
                chatbot.spawn_index_warmup();
            }
            server::serve(chatbot, listener).await?;
        }
        Command::Ask { question } => {
            let chatbot = Chatbot::from_settings(&settings).await?;
            if !chatbot.credential_status().is_loaded() {
                eprintln!("{}", chatbot.credential_status().message());
            }
            match chatbot.ask(&question).await? {
                Some(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                None => eprintln!("Nothing to ask."),
            }
        }
    }
    Ok(())
}
