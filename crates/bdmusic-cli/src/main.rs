use bdmusic_core::logging;

mod cli;

#[tokio::main]
async fn main() {
    // File logging when the state dir is usable, stderr otherwise.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match cli::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("bdmusic error: {:#}", err);
            std::process::exit(1);
        }
    }
}
