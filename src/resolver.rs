//! Connection resolution: logical server name to connection descriptor.
//!
//! The resolver owns the credential store. Given a logical name and target
//! database it produces a [`ConnectionDescriptor`], the sole boundary
//! artifact handed to the execution layer. Descriptors are never logged
//! and never serialized back to a caller.

use crate::constants::{
    DEFAULT_SQL_PORT, DEV_COMMAND_TIMEOUT, DEV_CONNECT_TIMEOUT, MAX_POOL_SIZE, MIN_POOL_SIZE,
    PROD_COMMAND_TIMEOUT, PROD_CONNECT_TIMEOUT,
};
use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use std::time::Duration;
use tiberius::{AuthMethod, Config, EncryptionLevel};

/// Environment class of a server address, selecting its timeout pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Classify an address: private/loopback ranges are development.
    pub fn classify(address: &str) -> Self {
        if is_private_address(address) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    fn connect_timeout(self) -> Duration {
        match self {
            Environment::Development => DEV_CONNECT_TIMEOUT,
            Environment::Production => PROD_CONNECT_TIMEOUT,
        }
    }

    fn command_timeout(self) -> Duration {
        match self {
            Environment::Development => DEV_COMMAND_TIMEOUT,
            Environment::Production => PROD_COMMAND_TIMEOUT,
        }
    }
}

/// Everything the execution layer needs to open one scoped connection.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    pub address: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
    pub multiple_active_result_sets: bool,
}

impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("address", &self.address)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionDescriptor {
    /// Host portion of the address (`"host,port"` or plain `"host"`).
    pub fn host(&self) -> &str {
        match self.address.split_once(',') {
            Some((host, _)) => host.trim(),
            None => self.address.trim(),
        }
    }

    /// Port portion of the address, defaulting to the TDS standard port.
    pub fn port(&self) -> u16 {
        self.address
            .split_once(',')
            .and_then(|(_, port)| port.trim().parse().ok())
            .unwrap_or(DEFAULT_SQL_PORT)
    }

    /// Assemble the driver configuration for this descriptor.
    ///
    /// Pool bounds and MARS have no direct knob on a single TDS session;
    /// they remain on the descriptor as the declared connection contract.
    pub fn to_client_config(&self) -> Config {
        let mut config = Config::new();
        config.host(self.host());
        config.port(self.port());
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.username, &self.password));
        config.application_name(env!("CARGO_PKG_NAME"));
        if self.trust_server_certificate {
            config.trust_cert();
        }
        if !self.encrypt {
            config.encryption(EncryptionLevel::Off);
        }
        config
    }
}

/// Resolves logical server names into connection descriptors.
#[derive(Debug, Clone)]
pub struct ConnectionResolver {
    credentials: CredentialStore,
}

impl ConnectionResolver {
    /// Create a resolver over an explicitly constructed credential store.
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }

    /// Resolve a logical name and target database.
    ///
    /// Fails with [`GatewayError::UnknownServer`] when the name has no
    /// credential. Pure apart from the lookup: no network I/O happens
    /// until the execution layer opens the connection.
    pub fn resolve(
        &self,
        logical_name: &str,
        database: &str,
    ) -> Result<ConnectionDescriptor, GatewayError> {
        let credential = self.credentials.credential_for(logical_name)?;
        let environment = Environment::classify(&credential.address);

        Ok(ConnectionDescriptor {
            address: credential.address.clone(),
            database: database.to_string(),
            username: credential.username.clone(),
            password: credential.password.clone(),
            connect_timeout: environment.connect_timeout(),
            command_timeout: environment.command_timeout(),
            max_pool_size: MAX_POOL_SIZE,
            min_pool_size: MIN_POOL_SIZE,
            encrypt: false,
            trust_server_certificate: true,
            multiple_active_result_sets: true,
        })
    }
}

/// Whether an address falls in a private or loopback range.
fn is_private_address(address: &str) -> bool {
    let host = address
        .split_once(',')
        .map_or(address, |(host, _)| host)
        .trim()
        .to_ascii_lowercase();

    if host.starts_with("localhost") || host.starts_with("127.") {
        return true;
    }
    if host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    // 172.16.0.0/12 covers second octets 16 through 31.
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some((octet, _)) = rest.split_once('.') {
            if let Ok(n) = octet.parse::<u8>() {
                return (16..=31).contains(&n);
            }
        }
    }
    false
}
