mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    admin::AdminSubcommand, config::ConfigSubcommand, order::OrderSubcommand,
    room::RoomSubcommand, vendor::VendorSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "drinkroom",
    about = "Daily drink room: draw a vendor, lock it, collect orders",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .drinkroom/)
    #[arg(long, global = true, env = "DRINKROOM_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .drinkroom/ with a default config and an empty store
    Init {
        /// Region used when a draw does not name one
        #[arg(long)]
        region: Option<String>,
    },

    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,

        /// Operator token signing key, overriding auth.token_secret
        #[arg(long, env = "DRINKROOM_TOKEN_SECRET", hide_env_values = true)]
        token_secret: Option<String>,
    },

    /// Manage the vendor catalog
    Vendor {
        #[command(subcommand)]
        subcommand: VendorSubcommand,
    },

    /// Show, draw, lock or reset a day's room
    Room {
        #[command(subcommand)]
        subcommand: RoomSubcommand,
    },

    /// Submit and list orders
    Order {
        #[command(subcommand)]
        subcommand: OrderSubcommand,
    },

    /// Operator account helpers
    Admin {
        #[command(subcommand)]
        subcommand: AdminSubcommand,
    },

    /// Validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { region } => cmd::init::run(&root, region.as_deref()),
        Commands::Serve { port, token_secret } => cmd::serve::run(&root, port, token_secret),
        Commands::Vendor { subcommand } => cmd::vendor::run(&root, subcommand, cli.json),
        Commands::Room { subcommand } => cmd::room::run(&root, subcommand, cli.json),
        Commands::Order { subcommand } => cmd::order::run(&root, subcommand, cli.json),
        Commands::Admin { subcommand } => cmd::admin::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
