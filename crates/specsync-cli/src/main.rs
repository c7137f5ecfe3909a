//! Command line entrypoint for specsync.

mod cli;
mod logging;
mod output;

fn main() -> eyre::Result<()> {
    cli::run()
}
