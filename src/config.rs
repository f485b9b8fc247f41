//! Configuration for conftree
//!
//! Centralized configuration with sensible defaults.

/// Default port of the configuration server
pub const DEFAULT_PORT: u16 = 4040;

/// Main configuration for clients and the reference server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// Address of the config server (host:port)
    pub server_addr: String,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Read timeout per transfer (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Write timeout per transfer (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Connections served at once; further clients are closed on accept
    pub max_connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            listen_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            max_connections: 64,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address (host:port)
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the server address from separate host and port
    pub fn server(mut self, host: &str, port: u16) -> Self {
        self.config.server_addr = if host.contains(':') && !host.starts_with('[') {
            // Bare IPv6 literal
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set how many clients the server serves at once
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
