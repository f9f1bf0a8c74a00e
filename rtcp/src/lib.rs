#![warn(rust_2018_idioms)]

pub mod goodbye;
pub mod header;
pub mod packet;
pub mod reception_report;
pub mod sender_report;

mod error;
mod util;

pub use error::Error;
