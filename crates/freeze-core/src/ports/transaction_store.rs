//! TransactionService port - 取引レコードの問い合わせと確定/取消
//!
//! Week ranges are half-open: `[week_start, week_end)`.

use async_trait::async_trait;

use crate::domain::{MoveId, ServiceError, Transaction};

#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Pending, frozen transactions queued during the freeze window.
    async fn get_frozen_transactions_by_week(
        &self,
        season: u32,
        week_start: u32,
        week_end: u32,
    ) -> Result<Vec<Transaction>, ServiceError>;

    /// Pending, non-frozen transactions waiting to be applied.
    async fn get_regular_transactions_by_week(
        &self,
        season: u32,
        week_start: u32,
        week_end: u32,
    ) -> Result<Vec<Transaction>, ServiceError>;

    /// Cancel every transaction sharing `move_id`. `false` if nothing matched.
    async fn cancel_transaction(&self, move_id: &MoveId) -> Result<bool, ServiceError>;

    /// Clear the frozen flag on every transaction sharing `move_id`.
    async fn unfreeze_transaction(&self, move_id: &MoveId) -> Result<bool, ServiceError>;
}
