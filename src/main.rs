use eventqueue::app::startup::startup;
use eventqueue::core::logging::flush_logging;

#[tokio::main]
async fn main() {
    let code = startup().await;
    flush_logging();
    std::process::exit(code);
}
