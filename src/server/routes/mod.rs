//! HTTP route modules

pub mod gateway;
