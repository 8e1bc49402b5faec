pub mod logging;
pub mod sql;
pub mod text;
