pub mod client;
pub mod models;
pub mod sync;

pub use client::{OrderPageSource, OrderPages, ShopifyClient, StoreCredentials};
pub use models::{NoteAttribute, RawOrder};
pub use sync::{OrderSink, OrderSynchronizer, SyncReport, UpsertOutcome};
