pub mod indicator_engine;
pub mod scheduler;
pub mod screener;
