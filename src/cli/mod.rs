//! Command line: `socratic serve` and `socratic chat`.

mod command;
mod repl;

pub use command::{ReplCommand, HELP};
pub use repl::{ansi_frame, ChatSession, Outcome};

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::gateway::{CompletionClient, HttpGateway};
use crate::graph::GraphCanvas;

/// Socratic dialogue assistant
#[derive(Parser, Debug)]
#[command(name = "socratic", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP completion gateway
    Serve {
        /// Address to bind; overrides BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Start a dialogue in the terminal
    Chat(ChatArgs),
}

/// Options for `socratic chat`
#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Talk to a running `socratic serve` instead of calling the model directly
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Where `/export` writes when no directory is given
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Print replies at once instead of revealing them
    #[arg(long)]
    pub no_animation: bool,
}

/// Run `socratic chat` until the user quits
pub async fn run_chat(config: &Config, args: ChatArgs) -> AppResult<()> {
    let canvas = GraphCanvas::new(config.canvas.width, config.canvas.height)?;
    let animate = !args.no_animation;

    match args.gateway_url {
        Some(url) => {
            let gateway = HttpGateway::new(&url, config.request.clone())?;
            info!(endpoint = %gateway.endpoint(), "Using HTTP gateway");
            ChatSession::new(gateway, canvas, args.export_dir, animate)
                .run()
                .await
        }
        None => {
            config.upstream.require_api_key()?;
            let client = CompletionClient::new(&config.upstream, config.request.clone())?;
            info!(base_url = %client.base_url(), model = %client.model(), "Calling upstream directly");
            ChatSession::new(client, canvas, args.export_dir, animate)
                .run()
                .await
        }
    }
}
