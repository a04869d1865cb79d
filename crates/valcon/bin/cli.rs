use clap::{
    builder::{styling::AnsiColor, Styles},
    ArgAction, Parser, Subcommand,
};
use tracing_subscriber::EnvFilter;
use valcon::cmd::{
    consolidate::ConsolidateCommand, fee::FeeCommand, validators::ValidatorsCommand,
};
use valcon_cli_runner::CliRunner;
use valcon_version::SHORT_VERSION;

/// The verbosity level.
pub type Verbosity = u8;

#[derive(Debug, Parser)]
#[command(
    name = "valcon",
    about = "Builds EIP-7251 validator consolidation transactions for an external signer.",
    author = "Valcon core developers",
    version = SHORT_VERSION.as_str(),
    term_width = 80,
    styles = get_color_style()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    /// Verbosity level of the log messages.
    ///
    /// Pass multiple times to increase the verbosity (e.g. -v, -vv, -vvv).
    #[arg(help_heading = "Display options", global = true, short, long, verbatim_doc_comment, action = ArgAction::Count)]
    verbosity: Verbosity,
}

impl Cli {
    pub fn run(self) -> eyre::Result<()> {
        self.init_tracing();

        let runner = CliRunner::default();
        match self.command {
            Commands::Validators(validators) => {
                runner.run_command_until_exit(|ctx| validators.execute(ctx))
            }
            Commands::Consolidate(consolidate) => {
                runner.run_command_until_exit(|ctx| consolidate.execute(ctx))
            }
            Commands::Fee(fee) => runner.run_command_until_exit(|ctx| fee.execute(ctx)),
        }
    }

    fn init_tracing(&self) {
        let default_directive = if self.debug {
            "debug"
        } else {
            match self.verbosity {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "validators")]
    Validators(ValidatorsCommand),

    #[command(name = "consolidate")]
    Consolidate(ConsolidateCommand),

    #[command(name = "fee")]
    Fee(FeeCommand),
}

fn get_color_style() -> Styles {
    Styles::styled()
        .usage(AnsiColor::Green.on_default().bold().underline())
        .header(AnsiColor::Yellow.on_default().bold().underline())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}
