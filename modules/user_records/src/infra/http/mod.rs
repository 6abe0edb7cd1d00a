pub mod record_store;
pub mod traced_client;

pub use record_store::HttpRecordStore;
pub use traced_client::TracedClient;
