pub mod repositories;
pub mod transaction;

mod database;
mod error_mapper;
mod repository_base;
mod result_ext;

pub use database::{Database, DatabaseOptions};
pub use error_mapper::RepositoryErrorMapper;
pub use repository_base::SqliteRepositoryBase;
pub use result_ext::ResultExt;
pub use transaction::{SqliteStreakTransaction, SqliteUnitOfWork};
