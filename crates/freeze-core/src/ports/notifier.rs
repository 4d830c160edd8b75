//! Notifier port - アナウンス・DM の送信
//!
//! Channels are addressed by name; the adapter maps names to whatever the
//! chat platform uses.

use async_trait::async_trait;

use crate::domain::{ServiceError, UserId};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_announcement(&self, channel: &str, message: &str) -> Result<(), ServiceError>;

    async fn direct_message(&self, user_id: UserId, message: &str) -> Result<(), ServiceError>;

    /// Remove earlier messages from a channel (used for the weekly info post).
    async fn clear_channel(&self, channel: &str) -> Result<(), ServiceError>;
}
