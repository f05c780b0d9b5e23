use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rsy")]
#[command(about = "Update-gate and app-utility toolbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> platform -> local...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Replay a timeline against a named gate and print every poll
    GateTrace {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Gate name under `gates.` in the config
        #[arg(long)]
        gate: String,

        /// Comma-separated `<t_ms>:<op>` list; ops: dirty, clean, poll, lock, unlock
        #[arg(long)]
        events: String,

        /// Construct the gate dirty at t=0
        #[arg(long, default_value_t = false)]
        initially_dirty: bool,
    },

    /// Submit or discard a debug-log report left by a previous run
    LogLeftover {
        /// Leftover report file
        #[arg(long)]
        path: String,

        /// JSONL file submitted reports are appended to
        #[arg(long)]
        sink: String,

        /// Delete without submitting (user opted out of debug info)
        #[arg(long, default_value_t = false)]
        discard: bool,
    },

    /// Simulate between-game ad decisions for a play session
    AdPlan {
        /// Layered config paths in merge order (defaults when omitted)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        #[arg(long, default_value_t = 3)]
        launch_count: u32,

        /// Number of games played
        #[arg(long, default_value_t = 10)]
        games: u32,

        /// Length of one game in seconds
        #[arg(long, default_value_t = 120)]
        game_secs: i64,

        /// Only static interstitials are available
        #[arg(long, default_value_t = false)]
        no_video: bool,
    },
}

fn main() -> Result<()> {
    // Dev convenience; silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = rsy_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::GateTrace {
            config_paths,
            gate,
            events,
            initially_dirty,
        } => {
            let (_, cfg) = commands::load_config(&config_paths)?;
            let policy = cfg.gate_policy(&gate)?;
            let events = commands::trace::parse_events(&events)?;
            for line in commands::trace::run_trace(policy, initially_dirty, &events)? {
                println!("{line}");
            }
        }

        Commands::LogLeftover { path, sink, discard } => {
            let outcome = commands::log::run_log_leftover(&path, &sink, !discard)?;
            println!("outcome={}", outcome);
        }

        Commands::AdPlan {
            config_paths,
            launch_count,
            games,
            game_secs,
            no_video,
        } => {
            let (_, cfg) = commands::load_config(&config_paths)?;
            let plan = commands::ads::AdPlan {
                launch_count,
                games,
                game_secs,
                has_video_ads: !no_video,
            };
            for line in commands::ads::run_ad_plan(cfg.ads, &plan) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
