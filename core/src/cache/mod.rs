pub mod decision_cache;
pub mod key;

pub use decision_cache::{CacheInsert, DecisionCache};
pub use key::normalize_url;
