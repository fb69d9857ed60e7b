//! One module per subcommand; each exposes `XArgs` and `execute`.

pub mod classify;
pub mod config;
pub mod evaluate;
pub mod run;
pub mod validate;
