use clap::Parser;
use todoliez::cli::commands::{Cli, Commands};
use todoliez::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // Init is handled before project discovery
        Some(Commands::Init(args)) => handlers::cmd_init(args),
        // No subcommand launches the TUI
        _ => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
