/// Runtime configuration sourced from environment variables, with
/// hard-coded fallbacks so the app runs out of the box against a local
/// gateway. A `.env` file in the working directory is honored if present.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) api_url: String,
    pub(crate) app_name: String,
    pub(crate) app_version: String,
    pub(crate) is_development: bool,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        // Missing .env is the normal case, not an error.
        let _ = dotenv::dotenv();

        let api_url = std::env::var("NEXTMOVE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8082".into());
        let app_name =
            std::env::var("NEXTMOVE_APP_NAME").unwrap_or_else(|_| "NextMove".into());
        let app_version = std::env::var("NEXTMOVE_APP_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").into());
        let is_development = std::env::var("NEXTMOVE_ENV")
            .map(|v| v.eq_ignore_ascii_case("development") || v.eq_ignore_ascii_case("dev"))
            .unwrap_or(false);

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            app_name,
            app_version,
            is_development,
        }
    }
}
