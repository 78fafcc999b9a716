use dotenv::dotenv;

pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn new() -> Self {
        dotenv().ok();
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "todo.sqlite".to_string());
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);
        Self {
            database_url,
            host,
            port,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
