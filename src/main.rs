#[tokio::main]
async fn main() {
    if let Err(e) = medinbox::run().await {
        eprintln!("medinbox: {e}");
        std::process::exit(1);
    }
}
