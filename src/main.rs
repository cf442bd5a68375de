use clap::Parser;

mod cli;

fn main() {
    cli::init_logging();
    cli::run(cli::Cli::parse());
}
