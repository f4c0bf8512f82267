use organ_match_cli::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("matchctl error: {err}");
        std::process::exit(1);
    }
}
