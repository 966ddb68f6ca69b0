pub mod backend;
pub mod compare;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod report;
pub mod suite;
pub mod transcript;
pub mod types;
