use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the backends the CLI can talk to.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// Backend running on the developer machine.
    Local,
    /// The hosted clinic backend.
    #[default]
    Production,
    /// Any other backend, addressed by its base URL.
    Custom { api_url: String },
}

impl Environment {
    /// Returns the backend base URL associated with the environment.
    pub fn api_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:5000".to_string(),
            Environment::Production => "https://mari-gualeguaychu.onrender.com".to_string(),
            Environment::Custom { api_url } => api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves the environment from an explicit URL, falling back to the
    /// `MARI_ENVIRONMENT` value (or the default when unset or unknown).
    pub fn resolve(api_url: Option<&str>, env_value: Option<&str>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            return Environment::Custom {
                api_url: url.trim().to_string(),
            };
        }
        env_value
            .and_then(|v| v.parse::<Environment>().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Production => write!(f, "Production"),
            Environment::Custom { .. } => write!(f, "Custom"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.api_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins_over_environment_variable() {
        let env = Environment::resolve(Some("http://10.0.0.2:5000/"), Some("local"));
        assert_eq!(env.api_url(), "http://10.0.0.2:5000");
        assert_eq!(env.to_string(), "Custom");
    }

    #[test]
    fn unknown_environment_falls_back_to_default() {
        assert_eq!(
            Environment::resolve(None, Some("mars")),
            Environment::Production
        );
        assert_eq!(Environment::resolve(Some("  "), Some("LOCAL")), Environment::Local);
    }
}
