// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod derived;
pub mod display;
pub mod error;
pub mod format;
pub mod models;
pub mod pool_classifier;
pub mod provider_repo;
pub mod routes;
pub mod version;
pub mod worker;
