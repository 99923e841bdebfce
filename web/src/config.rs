use musemate_core::MuseConfig;
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 24 * 60;

/// Everything the web daemon needs at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub session_idle_minutes: i64,
    pub muse: MuseConfig,
}

impl ServerConfig {
    /// Reads the spark settings from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>, http_addr: SocketAddr) -> anyhow::Result<Self> {
        let muse = match path {
            Some(path) => MuseConfig::load_from_file(path)?,
            None => MuseConfig::load_default()?,
        };
        Ok(Self {
            http_addr,
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
            muse,
        })
    }
}
