pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod identifier;
pub mod pagination;
pub mod query_params;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use identifier::Lookup;
pub use query_params::QueryFilter;
pub use types::*;
