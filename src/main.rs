use clap::Parser;
use meltvault::cli::{commands, output, Cli, Commands, Context};

fn main() {
    let cli = Cli::parse();

    // Completions need no settings; everything else loads .meltvault.toml.
    if let Commands::Completions { ref shell } = cli.command {
        exit_on_error(commands::completions::execute(shell));
        return;
    }

    let ctx = match Context::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Demo => commands::demo::execute(&ctx),
        Commands::Keygen { bits, ref format } => commands::keygen::execute(&ctx, bits, format),
        Commands::Session {
            ref attempts,
            ref format,
        } => commands::session::execute(&ctx, attempts, format),
        Commands::Race { threads, correct } => commands::race::execute(&ctx, threads, correct),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last, ref since } => {
            commands::audit_cmd::execute(&ctx, last, since.as_deref())
        }
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    exit_on_error(result);
}

fn exit_on_error(result: meltvault::errors::Result<()>) {
    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
