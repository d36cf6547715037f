pub mod base;
pub mod browser;
pub mod http;
pub mod nepse;
