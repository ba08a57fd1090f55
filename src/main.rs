use std::error::Error;

use emoji_feed::{cli, config::Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();

    cli::run(&config).await
}
