use crate::bookings::BookingRecord;
use async_trait::async_trait;

/// Write-only persistence for confirmed bookings; the engine never reads
/// them back.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn store(&self, record: &BookingRecord) -> anyhow::Result<()>;
}
