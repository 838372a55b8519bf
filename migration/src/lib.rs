pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_tracking_events;
mod m20260301_000002_pixels;
mod m20260302_000001_webhooks;
mod m20260303_000001_orders;
mod m20260304_000001_metrics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_tracking_events::Migration),
            Box::new(m20260301_000002_pixels::Migration),
            Box::new(m20260302_000001_webhooks::Migration),
            Box::new(m20260303_000001_orders::Migration),
            Box::new(m20260304_000001_metrics::Migration),
        ]
    }
}
