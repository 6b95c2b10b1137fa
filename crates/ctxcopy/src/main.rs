use clap::Parser;

fn main() -> anyhow::Result<()> {
    ctxcopy::cli::Cli::parse().run()
}
