use clap::Parser;
use hoshitori::cli::commands::{Cli, Commands};
use hoshitori::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // Init is handled before workspace discovery
        Commands::Init(args) => handlers::start_dir(cli.workspace_dir.as_deref())
            .and_then(|start| handlers::cmd_init(args, &start)),
        _ => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
