pub use super::ads::Entity as Ads;
pub use super::search_cache::Entity as SearchCache;
