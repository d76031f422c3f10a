pub mod aggregator;
pub mod calculator;
pub mod inputs;
pub mod service;
