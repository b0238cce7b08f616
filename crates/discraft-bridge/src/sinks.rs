//! Outbound action sinks

use crate::error::BridgeError;
use async_trait::async_trait;
use discraft_core::Snowflake;
use discraft_gateway::Connection;
use discraft_rest::RestClient;

/// Posts chat messages
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post(&self, channel_id: Snowflake, content: &str) -> Result<(), BridgeError>;
}

/// Updates the bot's presence line
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn set_activity(&self, activity: &str) -> Result<(), BridgeError>;
}

#[async_trait]
impl MessageSink for RestClient {
    async fn post(&self, channel_id: Snowflake, content: &str) -> Result<(), BridgeError> {
        self.create_message(channel_id, content).await?;
        Ok(())
    }
}

#[async_trait]
impl PresenceSink for Connection {
    async fn set_activity(&self, activity: &str) -> Result<(), BridgeError> {
        self.update_presence(activity).await?;
        Ok(())
    }
}
