use std::env;

pub const DEFAULT_PORT: u16 = 5000;

/// Browser origins allowed through the WebSocket handshake: the deployed
/// frontend plus local development.
pub const ALLOWED_ORIGINS: [&str; 2] = [
    "https://trellis-meet.vercel.app",
    "http://localhost:3000",
];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Reads `PORT` from the environment, falling back to [`DEFAULT_PORT`].
    pub fn from_env() -> Self {
        Self {
            port: parse_port(env::var("PORT").ok()),
            allowed_origins: ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|p| p.parse().ok()).unwrap_or(DEFAULT_PORT)
}
