pub mod applications;
pub mod candidates;
pub mod jobs;
pub mod store;
