pub mod analysis;
pub mod executor;
pub mod ids;
pub mod intake;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod store;
pub mod store_master;
pub mod validation;
