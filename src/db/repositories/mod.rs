pub mod ad;
pub mod cache;
