use clap::{Parser, Subcommand};
use snafu::{ResultExt, Snafu};
use tracing_subscriber::EnvFilter;
use vmit::create;

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to create instance type manifest"))]
    CreateInstancetype {
        source: create::instancetype::Error,
    },
}

#[derive(Debug, Parser)]
#[command(name = "vmit", version, about = "Compile virtual machine instance type manifests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create manifests for cluster resources.
    #[command(subcommand)]
    Create(CreateCommand),
}

#[derive(Debug, Subcommand)]
enum CreateCommand {
    /// Create an instance type manifest and write it to stdout.
    Instancetype(create::instancetype::InstancetypeArgs),
}

#[snafu::report]
fn main() -> Result<(), Error> {
    // Diagnostics go to stderr, stdout carries nothing but the manifest.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Create(CreateCommand::Instancetype(args)) => {
            let written = create::instancetype::run(&args, std::io::stdout().lock())
                .context(CreateInstancetypeSnafu)?;
            tracing::debug!(bytes = written, "wrote instance type manifest");
        }
    }

    Ok(())
}
