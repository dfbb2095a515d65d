/**
 * myflix command-line entry point
 *
 * Signs in with MYFLIX_USERNAME / MYFLIX_PASSWORD when no session is cached,
 * fetches the catalog and prints the signed-in user's favorites.
 */

use myflix_sync::client::{config, MyflixClient};
use myflix_sync::shared::Credentials;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = config::from_env()?;
    tracing::info!("Using {} (session file {})", config.api_url, config.store_path.display());
    let client = MyflixClient::from_config(&config);

    if !client.session().is_authenticated() {
        let (Ok(username), Ok(password)) = (std::env::var("MYFLIX_USERNAME"), std::env::var("MYFLIX_PASSWORD")) else {
            eprintln!("No cached session. Set MYFLIX_USERNAME and MYFLIX_PASSWORD to sign in.");
            std::process::exit(2);
        };
        if let Err(e) = client.api.login(&Credentials::new(username, password)).await {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }

    let catalog = match client.api.list_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };
    println!("{} titles in catalog", catalog.len());

    for movie in client.favorites.favorite_movies() {
        println!("* {}", movie.details_view().title());
    }

    Ok(())
}
