pub mod ev;
pub mod odds;
pub mod service;
