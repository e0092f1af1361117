pub mod error;
pub mod schema;
pub mod state;
pub mod utils;

pub use error::{StoreError, StoreResult};
pub use state::AppState;
pub use utils::{create_conn, run_migrations, DbPool};
