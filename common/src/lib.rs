pub mod align;
pub mod config;
pub mod error;
pub mod export;
pub mod metric;
pub mod plot;
pub mod summary;
pub mod util;

/// fio reports bandwidth in KiB/s
pub const KIB_PER_MIB: f64 = 1024.0;
