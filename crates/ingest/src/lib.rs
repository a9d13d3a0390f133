pub mod aggregate;
pub mod cache;
pub mod coingecko;
pub mod fetcher;
pub mod store;
