pub mod prelude;

pub mod ads;
pub mod search_cache;
