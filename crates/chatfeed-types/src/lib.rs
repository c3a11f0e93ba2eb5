pub mod api;
pub mod slack;
