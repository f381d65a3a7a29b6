//! CLI command implementations
//!
//! Every command opens its transport from a spec string and then talks to
//! the flash only through `qspictl_core`.

mod board;
mod list;
mod quad;
mod read;
mod status;

pub use board::run_board;
pub use list::list_transports;
pub use quad::{mode_config, run_quad_disable, run_quad_enable};
pub use read::run_read;
pub use status::run_status;
