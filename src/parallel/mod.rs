pub mod batch;
pub mod pool;

pub use batch::{
    batch_ranges, resolve_batch, resolve_batch_with_progress, resolve_sequential,
};
pub use pool::WorkerPool;
