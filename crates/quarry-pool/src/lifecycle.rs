//! Connection lifecycle hooks supplied by the embedding driver.
//!
//! The pool never speaks a wire protocol itself. It asks a
//! [`ConnectionLifecycle`] implementation to open a transport when the pool
//! fills and to close it again when the pool drains.

use async_trait::async_trait;

use crate::connection::ConnectionId;
use crate::error::BoxError;

/// Opens and closes the transports held by a pool.
///
/// # Example
///
/// ```rust,ignore
/// struct TcpLifecycle { addr: SocketAddr }
///
/// #[async_trait]
/// impl ConnectionLifecycle for TcpLifecycle {
///     type Transport = TcpStream;
///
///     async fn connect(&self, _id: ConnectionId) -> Result<TcpStream, BoxError> {
///         Ok(TcpStream::connect(self.addr).await?)
///     }
///
///     async fn close(&self, _id: ConnectionId, mut stream: TcpStream) -> Result<(), BoxError> {
///         stream.shutdown().await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ConnectionLifecycle: Send + Sync + 'static {
    /// The opaque transport handle owned by a pooled connection.
    type Transport: Send + 'static;

    /// Establish a new transport for the connection `id`.
    async fn connect(&self, id: ConnectionId) -> Result<Self::Transport, BoxError>;

    /// Close a transport. Called exactly once per established transport.
    async fn close(&self, id: ConnectionId, transport: Self::Transport) -> Result<(), BoxError>;
}
