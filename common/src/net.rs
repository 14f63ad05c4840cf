use anyhow::Result;
use quinn::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ============================================================================
// Message Stream Abstraction
// ============================================================================

// One JSON message per unidirectional stream; stream end delimits the
// message, so no explicit framing is needed.
pub struct MessageStream<'a> {
    connection: &'a Connection,
}

impl<'a> MessageStream<'a> {
    #[must_use]
    pub const fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub async fn send<T: Serialize + Send + Sync>(&self, msg: &T) -> Result<()> {
        let mut stream = self.connection.open_uni().await?;
        let data = serde_json::to_vec(msg)?;
        stream.write_all(&data).await?;
        stream.finish()?;
        Ok(())
    }

    pub async fn recv<T: DeserializeOwned + Send>(&self) -> Result<T> {
        let mut recv = self.connection.accept_uni().await?;
        let data = recv.read_to_end(1024 * 1024).await?; // 1MB limit
        let result = serde_json::from_slice(&data)?;
        Ok(result)
    }

    /// Receive one message as raw JSON without committing to a message type.
    /// The relay uses this to tell malformed payloads apart from well-formed
    /// messages of an unknown kind.
    pub async fn recv_raw(&self) -> Result<Vec<u8>> {
        let mut recv = self.connection.accept_uni().await?;
        let data = recv.read_to_end(1024 * 1024).await?; // 1MB limit
        Ok(data)
    }
}
