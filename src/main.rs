use anyhow::Result;
use quickterm::cli;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // Route log::info!() etc. to /tmp/quickterm_debug.log.
    // CLI --log-level takes precedence, then RUST_LOG, then the config file.
    quickterm::debug::init_log_bridge(options.log_level);

    log::info!("Starting quickterm {}", quickterm::VERSION);

    let result = cli::run(&options);
    if let Err(ref e) = result {
        eprintln!("quickterm: error: {e:#}");
    }
    result
}
