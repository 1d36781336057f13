use async_trait::async_trait;
use chrono::NaiveDate;
use potd_model::{DayRecord, NewDayRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a record for {0} already exists")]
    UniqueViolation(NaiveDate),

    #[error("record store error: {0}")]
    Backend(String),
}

/// Durable, date-keyed record storage.
#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    /// Exact-key lookup; `Ok(None)` is a miss.
    async fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DayRecord>, StoreError>;

    /// Insert-only write. An existing record for the same date must yield
    /// [`StoreError::UniqueViolation`] and leave the stored record untouched.
    async fn insert(&self, record: NewDayRecord)
    -> Result<DayRecord, StoreError>;
}
