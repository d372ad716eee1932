//! Scoped connection establishment.
//!
//! Every operation opens exactly one TDS session from its descriptor and
//! drops it at the end of the request scope, which releases the socket on
//! every exit path including errors. Pooling beyond that is left to the
//! transport layer.

use crate::error::GatewayError;
use crate::resolver::ConnectionDescriptor;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// A live client session against one backend server.
pub type BackendClient = Client<Compat<TcpStream>>;

/// Open a connection described by the resolver output.
///
/// The descriptor's connect timeout bounds both the TCP dial and the TDS
/// handshake; either expiring surfaces as `BackendUnavailable`.
pub async fn open_connection(
    descriptor: &ConnectionDescriptor,
) -> Result<BackendClient, GatewayError> {
    let config = descriptor.to_client_config();

    debug!(
        host = descriptor.host(),
        port = descriptor.port(),
        database = %descriptor.database,
        "opening backend connection"
    );

    let tcp = timeout(
        descriptor.connect_timeout,
        TcpStream::connect((descriptor.host().to_string(), descriptor.port())),
    )
    .await??;
    tcp.set_nodelay(true)?;

    let client = timeout(
        descriptor.connect_timeout,
        Client::connect(config, tcp.compat_write()),
    )
    .await??;

    Ok(client)
}
