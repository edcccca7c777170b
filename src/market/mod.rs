pub mod quote;
pub mod yahoo;

pub use quote::{PriceBook, Quote, YAHOO_SOURCE};
pub use yahoo::YahooClient;
