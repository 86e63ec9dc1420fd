//! Map-instantiation service settings.

use std::str::FromStr;
use std::time::Duration;

/// Protocol the dashboard page is served over; decides which CDN entry the
/// endpoint resolver may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(format!("unknown protocol: {}", other)),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Settings for the map-instantiation endpoint and tile URL construction.
#[derive(Debug, Clone)]
pub struct MapsApiConfig {
    /// Host of the mapping service, e.g. `acme.example.com`.
    pub maps_host: String,
    /// Account owning the generated layer groups.
    pub username: String,
    /// Pre-issued API key.
    pub api_key: String,
    /// Active page protocol.
    pub protocol: Protocol,
    /// HTTP request timeout for instantiation calls.
    pub request_timeout: Duration,
}

impl Default for MapsApiConfig {
    fn default() -> Self {
        Self {
            maps_host: "example.com".to_string(),
            username: "demo".to_string(),
            api_key: String::new(),
            protocol: Protocol::Https,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MapsApiConfig {
    /// URL of the map-instantiation endpoint.
    pub fn instantiation_url(&self) -> String {
        format!(
            "{}://{}/user/{}/api/v1/map",
            self.protocol.scheme(),
            self.maps_host,
            self.username
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!("http".parse::<Protocol>().unwrap(), Protocol::Http);
        assert_eq!("HTTPS".parse::<Protocol>().unwrap(), Protocol::Https);
        assert!("gopher".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_instantiation_url() {
        let config = MapsApiConfig {
            maps_host: "maps.example.com".into(),
            username: "alice".into(),
            ..Default::default()
        };
        assert_eq!(
            config.instantiation_url(),
            "https://maps.example.com/user/alice/api/v1/map"
        );
    }
}
