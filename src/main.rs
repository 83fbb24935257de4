use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use webwrap::core::config::{self, CliOverrides};
use webwrap::tui;

#[derive(Parser)]
#[command(name = "webwrap", about = "Browse the web from your terminal")]
struct Args {
    /// URL to open right away (scheme optional)
    url: Option<String>,

    /// Keep links to other sites inside webwrap instead of the system browser
    #[arg(long)]
    in_place: bool,

    /// User-Agent header to send
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to webwrap.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("webwrap.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        Default::default()
    });
    let cli = CliOverrides {
        user_agent: args.user_agent,
        in_place: args.in_place,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "webwrap starting up (home: {}, external links: {})",
        resolved.home_url,
        resolved.open_external_links
    );

    tui::run(resolved, args.url)
}
