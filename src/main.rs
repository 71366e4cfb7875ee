use std::env;

use log::{LevelFilter, error};
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() {
    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        init_logging(LevelFilter::Info);
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = brokedate::api::run_http_server(port).await {
            error!("server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    init_logging(LevelFilter::Warn);
    match brokedate::api::run_cli(raw_args) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    }
}

/// `RUST_LOG` overrides the default level.
fn init_logging(level: LevelFilter) {
    if let Err(e) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("logger already initialised: {e}");
    }
}
