//! Built-in business handlers.

pub mod biz;

pub use biz::BizService;
