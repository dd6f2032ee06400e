//! Deployment target types
//!
//! The cf CLI keeps its login and target as hidden global state. The
//! façade instead threads an explicit [`CfTarget`] through `login`, and
//! exposes whatever the ambient CLI currently points at as a parsed
//! [`CurrentTarget`] so scripts can offer defaults.

/// Everything needed to log in and target an org/space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfTarget {
    /// CF API URL, e.g. `https://api.example.com`
    pub api_url: String,
    /// Username
    pub user: String,
    /// Password
    pub password: String,
    /// Organization name
    pub org: String,
    /// Space name
    pub space: String,
}

/// The target the ambient CLI session currently points at, from
/// `cf target` output. Fields are absent when nothing is set, e.g. when
/// logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentTarget {
    /// API endpoint
    pub api_url: Option<String>,
    /// Logged-in user
    pub user: Option<String>,
    /// Targeted organization
    pub org: Option<String>,
    /// Targeted space
    pub space: Option<String>,
}

impl CurrentTarget {
    /// Parse `cf target` output.
    ///
    /// The CLI prints `key: value` lines; keys have varied in casing
    /// across CLI versions ("API endpoint", "api endpoint", "User",
    /// "user"), so matching is case-insensitive.
    pub fn parse(output: &str) -> Self {
        let mut target = Self::default();
        for line in output.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim().to_lowercase().as_str() {
                "api endpoint" => target.api_url = Some(value.to_string()),
                "user" => target.user = Some(value.to_string()),
                "org" => target.org = Some(value.to_string()),
                "space" => target.space = Some(value.to_string()),
                _ => {}
            }
        }
        target
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
