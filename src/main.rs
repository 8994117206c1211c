use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = handover::cli::Cli::parse();
    if let Err(e) = handover::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
