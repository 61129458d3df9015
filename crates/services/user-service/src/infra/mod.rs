//! Infrastructure layer - connections to the store.

mod connection;
mod connector;

pub use connection::{with_connection, Connection, ConnectionProvider};
pub use connector::{
    connection_url, DirectConnector, PooledConnector, TrustMaterial, CLIENT_CERT_FILE,
    CLIENT_KEY_FILE, ROOT_CERT_FILE,
};

#[cfg(any(test, feature = "test-utils"))]
pub use connection::MockConnectionProvider;
