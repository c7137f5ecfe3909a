//! Command dispatch for the `specsync` entrypoint.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use specsync::{
    RunReport, StubConfig, StubLayout, generate_specs_from_module, generate_stubs_from_specs,
};

use crate::logging;
use crate::output;

/// Synchronize specification text with tagged Rust test sources.
#[derive(Parser)]
#[command(name = "specsync", version, about)]
struct Cli {
    /// Log filter directive, e.g. `info` or `specsync=debug`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Supported commands.
#[derive(Subcommand)]
enum Commands {
    /// Regenerate specification text from a tagged test module.
    Specs(SpecsArgs),
    /// Generate test-source skeletons from specification text.
    Stubs(StubsArgs),
}

#[derive(Args)]
struct SpecsArgs {
    /// Path to the tagged Rust source module.
    module: Utf8PathBuf,

    /// Directory to write `.feature` files into.
    #[arg(long, default_value = "specs")]
    out: Utf8PathBuf,

    /// Emit the run report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StubsArgs {
    /// Directory holding `.feature` specification files.
    specs: Utf8PathBuf,

    /// Directory to write generated Rust skeletons into.
    #[arg(long, default_value = "tests/generated")]
    out: Utf8PathBuf,

    /// Import path for the tagging attributes in generated files.
    #[arg(long, default_value = "specsync")]
    namespace: String,

    /// Emit one file per scenario instead of one per feature.
    #[arg(long)]
    per_scenario: bool,

    /// Emit the run report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Parse arguments, run the requested pipeline, and report.
///
/// The process exits non-zero when any unit failed, while the outputs of
/// the units that succeeded stay on disk.
pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());
    let (report, json) = match cli.command {
        Commands::Specs(args) => (handle_specs(&args)?, args.json),
        Commands::Stubs(args) => (handle_stubs(&args)?, args.json),
    };
    if json {
        output::write_json(&report)?;
    } else {
        output::write_text(&report)?;
    }
    if !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_specs(args: &SpecsArgs) -> Result<RunReport> {
    generate_specs_from_module(&args.module, &args.out)
        .wrap_err_with(|| format!("failed to generate specs from {}", args.module))
}

fn handle_stubs(args: &StubsArgs) -> Result<RunReport> {
    let config = StubConfig {
        layout: if args.per_scenario {
            StubLayout::Module
        } else {
            StubLayout::Function
        },
        namespace: args.namespace.clone(),
    };
    generate_stubs_from_specs(&args.specs, &args.out, &config)
        .wrap_err_with(|| format!("failed to generate stubs from {}", args.specs))
}
