use std::fs::File;
use std::sync::Arc;

use chatpro::core::config::{self, CliOverrides, UiMode};
use chatpro::net::{ChatApi, HttpApi};
use chatpro::tui::{self, Exit};
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "chatpro", about = "Terminal client for ChatPro rooms")]
struct Args {
    /// Chat server base URL (REST); the WebSocket URL is derived from it
    #[arg(short, long)]
    server: Option<String>,

    /// Display name in rooms
    #[arg(short, long)]
    username: Option<String>,

    /// Interface variant; `auto` probes the terminal
    #[arg(long, value_enum)]
    ui: Option<UiMode>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to chatpro.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("chatpro.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: {e}, using defaults");
        log::warn!("Config load failed: {}", e);
        Default::default()
    });
    let cli = CliOverrides {
        username: args.username,
        server_url: args.server,
        ui_mode: args.ui,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "ChatPro starting up as {} against {} (ws {})",
        resolved.username,
        resolved.server_url,
        resolved.ws_url
    );

    let api = HttpApi::new(
        &resolved.server_url,
        resolved.request_timeout,
        resolved.session_cookie.clone(),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let api: Arc<dyn ChatApi> = Arc::new(api);

    let rooms = match api.list_rooms().await {
        Ok(rooms) => rooms,
        Err(e) => {
            log::warn!("Could not load rooms, starting with none: {}", e);
            Vec::new()
        }
    };

    let exit = tui::run(resolved, Arc::clone(&api), rooms)?;

    if exit == Exit::Logout {
        match api.logout().await {
            Ok(()) => log::info!("Logged out"),
            Err(e) => log::warn!("Logout request failed: {}", e),
        }
        println!("Logged out.");
    }
    Ok(())
}
