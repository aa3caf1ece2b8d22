mod check;
mod flush_cache;

pub use check::cmd_check;
pub use flush_cache::cmd_flush_cache;
