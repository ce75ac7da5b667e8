pub mod twitter;

pub use twitter::TwitterConnector;
