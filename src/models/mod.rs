pub mod job;
pub mod responses;
pub mod visit;
