pub mod api_key;
pub mod filters;
pub mod pagination;
pub mod resource;
pub mod taxonomy;
