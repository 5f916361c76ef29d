pub mod http;

pub use http::HttpScoringClient;
