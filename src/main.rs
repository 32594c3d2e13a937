mod cli;
mod execute;

use clap::Parser;
use colored::Colorize;
use blendget::error::Error;
use crate::cli::CLI;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = CLI::parse();
    if let Err(err) = execute::execute(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        let code = err.downcast_ref::<Error>().map_or(1, Error::exit_code);
        std::process::exit(code);
    }
}
