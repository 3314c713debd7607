#[tokio::main]
async fn main() {
    if chip_ledger::run_with_config().await.is_err() {
        std::process::exit(1);
    }
}
