// Gallery image proxy library

pub mod access;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod proxy;
pub mod reload;
pub mod upstream;
pub mod watermark;
