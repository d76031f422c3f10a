pub mod navigation;
pub mod resolver;
pub mod service;
