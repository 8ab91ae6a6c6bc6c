use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use indabom::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`indabom part list | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => indabom::cli::commands::init::run(args),
        Commands::Part(cmd) => indabom::cli::commands::part::run(cmd, &global),
        Commands::Offer(cmd) => indabom::cli::commands::offer::run(cmd, &global),
        Commands::Indented(args) => indabom::cli::commands::indented::run(args, &global),
        Commands::Export(args) => indabom::cli::commands::export::run(args, &global),
        Commands::Import(args) => indabom::cli::commands::import::run(args, &global),
        Commands::Completions(args) => indabom::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `INDABOM_LOG` takes an `EnvFilter` directive
fn init_tracing(verbose: bool) {
    let default = if verbose { "indabom=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("INDABOM_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
