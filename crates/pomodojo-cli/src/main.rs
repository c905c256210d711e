use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomodojo", version, about = "Pomodojo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Focus, break and cycle preferences
    Preferences {
        #[command(subcommand)]
        action: commands::preferences::PreferencesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Completed-session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("POMODOJO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Preferences { action } => commands::preferences::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pomodojo", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
