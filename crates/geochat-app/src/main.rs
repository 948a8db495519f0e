mod cli;
mod location;
mod render;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use geochat_ai::{
    ChatMode, Conversation, GeminiClient, GeminiConfig, LocationError, TurnOutcome,
};

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Workspace root — two levels up from crates/geochat-app/
        manifest_dir.join("..").join("..").join(".env"),
        // Current directory
        std::path::PathBuf::from(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

fn mode_badge(mode: ChatMode, config: &GeminiConfig) -> String {
    match mode {
        ChatMode::MapsAndSearch => format!(
            "Using {} with Google Maps & Search",
            config.model_for(mode)
        ),
        ChatMode::ProChat => format!("Using {}", config.model_for(mode)),
    }
}

fn location_banner(err: &LocationError) -> &'static str {
    match err {
        LocationError::Denied => "Location access denied. Local results may be less accurate.",
        LocationError::Unavailable(_) => {
            "Geolocation is not configured. Local results may be less accurate."
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    load_dotenv();

    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("geochat=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "geochat=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("GeoChat v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match GeminiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    tracing::debug!(config = ?config, "resolved configuration");

    // One client, built once and passed down.
    let client = GeminiClient::new(config.clone());

    // One-shot position probe; failure is a banner, never fatal.
    let provider = location::resolve_provider(args.location.as_deref());
    let position = match provider.current_position().await {
        Ok(position) => {
            tracing::info!(
                latitude = position.latitude,
                longitude = position.longitude,
                "position resolved"
            );
            Some(position)
        }
        Err(err) => {
            tracing::warn!(error = %err, "position unavailable");
            println!("{}", location_banner(&err));
            None
        }
    };

    let mode = ChatMode::from(args.mode);
    let mut conversation = Conversation::new(mode).with_location(position);
    let mut snapshots = conversation.subscribe();

    println!("{}", mode_badge(mode, &config));
    println!("Commands: /mode maps|pro, /sources, /quit. Ctrl-C cancels a reply.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => break,
            Err(err) => {
                tracing::error!(error = %err, "stdin read failed");
                break;
            }
        };
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            match command.split_whitespace().collect::<Vec<_>>().as_slice() {
                ["quit"] | ["exit"] => break,
                ["mode"] => println!("{}", mode_badge(conversation.mode(), &config)),
                ["mode", "maps"] => {
                    conversation.select_mode(ChatMode::MapsAndSearch);
                    println!("{}", mode_badge(ChatMode::MapsAndSearch, &config));
                }
                ["mode", "pro"] => {
                    conversation.select_mode(ChatMode::ProChat);
                    println!("{}", mode_badge(ChatMode::ProChat, &config));
                }
                ["sources"] => match conversation.active_grounding() {
                    Some(grounding) => print!("{}", render::format_sources(grounding)),
                    None => println!("No sources yet."),
                },
                _ => println!("Unknown command: /{command}"),
            }
            continue;
        }

        // One turn. Ctrl-C fires the token; the turn ends Cancelled and
        // input is re-enabled. Blank input was filtered above and the
        // REPL is sequential, so submit never returns Ignored here and
        // the printer always sees a terminal snapshot.
        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::signal::ctrl_c() => cancel.cancel(),
                }
            })
        };

        // Commands publish snapshots too; drop any pending change so the
        // printer starts from this turn's Sending snapshot.
        snapshots.mark_unchanged();
        let (outcome, _) = tokio::join!(
            conversation.submit(&client, line, cancel.clone()),
            render::print_turn(&mut snapshots)
        );
        cancel.cancel();
        let _ = interrupt.await;

        if outcome == TurnOutcome::Sealed {
            if let Some(grounding) = conversation
                .messages()
                .last()
                .and_then(|message| message.grounding.as_ref())
            {
                print!("{}", render::format_sources(grounding));
            }
        }
    }

    tracing::info!("Shutdown complete");
}
