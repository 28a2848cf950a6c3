#[tokio::main]
async fn main() {
  if let Err(e) = ultra_coach::run().await {
    eprintln!("ultra-coach failed to start: {}", e);
    std::process::exit(1);
  }
}
