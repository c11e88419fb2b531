pub mod admin;
pub mod defaults;
pub mod error;
pub mod initializer;
pub mod model;
pub mod query;
pub mod store;

pub use admin::MenuAdminService;
pub use defaults::{default_menu, load_defaults, DefaultItem};
pub use error::{MenuError, MenuResult, ValidationError, Violation};
pub use initializer::{InitReport, Initializer, RetryPolicy};
pub use model::{Category, MenuItem, MenuPatch, Role};
pub use query::{MenuEntry, MenuQueryService, MenuSection};
pub use store::{MemoryMenuStore, MenuFilter, MenuStore, UpsertOutcome};
