pub mod manager;
pub mod menu_store;
pub mod models;

pub use manager::{DatabaseError, DatabaseHandle};
pub use menu_store::PgMenuStore;
