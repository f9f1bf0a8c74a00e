#![warn(rust_2018_idioms)]

mod error;
pub mod header;
pub mod packet;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
