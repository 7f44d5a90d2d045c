use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Runtime configuration, read from the environment.
///
/// - `CQM_HOST` / `CQM_PORT` choose the listen address.
/// - `CQM_MEASURES_DIR` points at a directory of measure bundle files to
///   preload into the registry at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub measures_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            measures_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("CQM_HOST")
            && !host.is_empty()
        {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("CQM_PORT")
            && let Ok(port) = port.parse()
        {
            cfg.port = port;
        }
        if let Ok(dir) = std::env::var("CQM_MEASURES_DIR")
            && !dir.is_empty()
        {
            cfg.measures_dir = Some(PathBuf::from(dir));
        }
        cfg
    }

    pub fn addr(&self) -> SocketAddr {
        let host: IpAddr = self
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.port))
    }
}
