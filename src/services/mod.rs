pub mod ad_service;
pub use ad_service::{AdError, AdService};

pub mod ad_service_impl;
pub use ad_service_impl::SeaOrmAdService;

pub mod search;
pub use search::SearchSettings;
