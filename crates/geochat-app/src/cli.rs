use clap::{Parser, ValueEnum};

use geochat_ai::ChatMode;

/// GeoChat — a terminal chat client with Maps & Search grounding.
#[derive(Parser, Debug)]
#[command(name = "geochat", version, about)]
pub struct Args {
    /// Chat mode to start in.
    #[arg(short = 'm', long, value_enum, default_value_t = ModeArg::Maps)]
    pub mode: ModeArg,

    /// Fixed position as "lat,lon" used to bias Maps-mode results.
    /// Falls back to the GEOCHAT_LOCATION env var.
    #[arg(short = 'l', long)]
    pub location: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Location expert grounded in Google Maps and Search.
    Maps,
    /// General assistant without retrieval tools.
    Pro,
}

impl From<ModeArg> for ChatMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Maps => ChatMode::MapsAndSearch,
            ModeArg::Pro => ChatMode::ProChat,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
