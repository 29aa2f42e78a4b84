use std::path::Path;

use clap::Parser;
use miette::Result;
use texkit::cli::{Cli, Commands, Context};
use texkit::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pack(args) => texkit::cli::pack::run(args, &context(cli.config.as_deref(), cli.verbose)?)?,
        Commands::Sample(args) => texkit::cli::sample::run(args, &context(cli.config.as_deref(), cli.verbose)?)?,
        Commands::Validate(args) => {
            texkit::cli::validate::run(args, &context(cli.config.as_deref(), cli.verbose)?)?
        }
        Commands::Init(args) => {
            init_logging(cli.verbose);
            texkit::cli::init::run(args, &Printer::new())?
        }
        Commands::Completions(args) => texkit::cli::completions::run(args)?,
    }

    Ok(())
}

/// Load the config, then start logging at the verbosity it asks for.
fn context(config: Option<&Path>, verbose: bool) -> Result<Context> {
    let ctx = Context::load(config, verbose)?;
    init_logging(ctx.verbose);
    Ok(ctx)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "texkit=debug" } else { "texkit=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
