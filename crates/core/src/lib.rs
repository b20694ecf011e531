#![forbid(unsafe_code)]

pub mod aggregate;
pub mod model;
pub mod time;

pub use time::Clock;
