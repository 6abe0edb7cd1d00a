use async_trait::async_trait;

use crate::contract::{
    error::RecordStoreError,
    model::{RecordId, UserPayload, UserRecord},
};

/// Remote record store as seen by the controllers.
#[async_trait]
pub trait RecordStoreApi: Send + Sync {
    /// Gender options the form offers
    async fn list_genders(&self) -> Result<Vec<String>, RecordStoreError>;

    /// All records
    async fn list_records(&self) -> Result<Vec<UserRecord>, RecordStoreError>;

    /// Create a new record; the store assigns the id
    async fn create_record(&self, payload: &UserPayload) -> Result<(), RecordStoreError>;

    /// Replace the record stored under `id`
    async fn update_record(
        &self,
        id: &RecordId,
        payload: &UserPayload,
    ) -> Result<(), RecordStoreError>;

    /// Delete the record stored under `id`
    async fn delete_record(&self, id: &RecordId) -> Result<(), RecordStoreError>;
}
