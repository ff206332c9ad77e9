use std::path::PathBuf;

/// Port used when no port option is supplied.
pub const DEFAULT_PORT: u16 = 4400;

/// Server configuration, built once at startup from caller-supplied options
/// merged over defaults and passed explicitly into each handler constructor.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory served for all paths outside the upload and info pages
    pub server_root: PathBuf,
    /// Where uploads are saved; `None` selects echo mode
    pub save_directory: Option<PathBuf>,
    /// Command line usage text shown on the info page
    pub usage_message: Option<String>,
    /// Bind on all interfaces instead of loopback only
    pub allow_all: bool,
    /// Simulated network delay in seconds, applied after each upload
    pub network_delay: u64,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            server_root: PathBuf::from("."),
            save_directory: None,
            usage_message: None,
            allow_all: false,
            network_delay: 0,
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Address to bind the listener to: loopback only unless `allow_all`.
    pub fn bind_address(&self) -> String {
        let host = if self.allow_all { "0.0.0.0" } else { "127.0.0.1" };
        format!("{}:{}", host, self.port)
    }
}
