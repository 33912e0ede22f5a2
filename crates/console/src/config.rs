use heritage_core::collation::DEFAULT_COLLATION_LOCALE;

/// Default backend origin for local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Console configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Backend origin; image files are also served from here.
    pub backend_url: String,
    /// BCP-47 locale used to sort heritage titles.
    pub collation_locale: String,
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HERITAGE_BACKEND_URL`      | `http://localhost:8000` |
    /// | `HERITAGE_COLLATION_LOCALE` | `ja`                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("HERITAGE_BACKEND_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());

        let collation_locale = lookup("HERITAGE_COLLATION_LOCALE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_COLLATION_LOCALE.into());

        Self {
            backend_url,
            collation_locale,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
