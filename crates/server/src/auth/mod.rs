pub mod api_key;
pub mod membership;
pub mod utils;
