//! Execute Cache Module
//!
//! Cache-aside orchestration for computations: look the response up in a
//! region cache, run the computation on a miss, store cacheable results and
//! optionally mirror them into a secondary cache.

mod async_cache;
mod cache;
mod request;

pub use async_cache::AsyncExecuteCache;
pub use cache::ExecuteCache;
pub use request::{
    AsyncExecutableRequest, AsyncSecondaryCache, CheckOptions, ExecutableRequest,
    ExecuteResponse, SecondaryCache,
};
