pub mod error;
pub mod models;
pub mod numeric;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
