pub mod estimator;
pub mod quote_service;
