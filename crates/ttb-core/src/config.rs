/// Process configuration, read once at startup from the environment.
///
/// No config file format: just `std::env::var` with sane defaults and a
/// single place that owns the parsing.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the gateway binds to. `PORT` env var, default 3000.
    pub port: u16,
    /// Connection string for the state store (e.g. a `redis://` URL).
    pub store_url: String,
    /// Connection string for the durable stats store.
    pub db_url: Option<String>,
    /// Verbose logging toggle. `development` env var, any non-empty truthy value.
    pub development: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            store_url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            db_url: std::env::var("DB_URL").ok(),
            development: std::env::var("development")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // SAFETY: single-threaded test, no other thread reads these vars concurrently.
        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("development");
        }
        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert!(!config.development);
    }
}
