use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = iiif_ingest::Cli::parse();

    let log_level = if cli.verbose() {
        Level::DEBUG
    } else {
        Level::WARN
    };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = iiif_ingest::run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
