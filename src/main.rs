use clap::Parser;

use vm_translator::cli::{self, Cli};
use vm_translator::{error, log};

fn main() {
    let args = Cli::parse();
    log::set_quiet(args.quiet);
    log::set_color(std::env::var_os("NO_COLOR").is_none());

    let result = args.config().and_then(|config| cli::run(&config));
    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
