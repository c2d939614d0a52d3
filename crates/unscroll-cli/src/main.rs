use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "unscroll-cli", version, about = "Unscroll CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blocked target management
    Target {
        #[command(subcommand)]
        action: commands::target::TargetAction,
    },
    /// Schedule rule management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Interactive challenge session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Foreground monitor
    Monitor {
        #[command(subcommand)]
        action: commands::monitor::MonitorAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Target { action } => commands::target::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Monitor { action } => commands::monitor::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
