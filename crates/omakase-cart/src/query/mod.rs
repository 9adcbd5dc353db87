//! Cart query cache and reads.

mod cache;
mod fetch;

pub use cache::{
    CacheObserver, CartQueryCache, DataOrigin, FetchTicket, QueryResult, QueryState, QueryStatus,
};
pub use fetch::CartQuery;
