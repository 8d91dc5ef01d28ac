//! Ricochet CLI binary.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use ricochet::cli::args::RicochetArgs;
use ricochet::cli::commands::execute_command;

fn main() {
    // Flags first; verbosity decides the log level
    let args = RicochetArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    // Library code logs through `log`; route it to stderr as `[LEVEL] msg`
    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    // Run the subcommand and map failure to exit status 1
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
