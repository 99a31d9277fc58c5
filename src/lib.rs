pub mod error;
pub mod dates;
pub mod observation;
pub mod stats;
pub mod patterns;
pub mod sampler;
pub mod prompt;
pub mod config;
pub mod request;
pub mod requestor;
pub mod report;
