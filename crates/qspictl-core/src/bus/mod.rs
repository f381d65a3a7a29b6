//! Bus attachment
//!
//! A flash device on a quad-capable bus is attached together with a pair of
//! hooks. The bus side calls the enter hook once before a sequence of wide
//! transfers and the exit hook once after, and tracks which wire mode the
//! device was last left in.
//!
//! ```text
//!   begin_quad()  ──► hooks.enter_quad() ──► WireMode::Quad
//!   quad transfers (e.g. read_quad_out)
//!   end_quad()    ──► hooks.exit_quad()  ──► WireMode::Single
//!                       any failure      ──► WireMode::Unknown
//! ```
//!
//! The attachment owns its transport, so calls on one device are serialized
//! by the borrow checker.

mod attachment;
mod hooks;

pub use attachment::{BusAttachment, DataLines, WireMode, MAX_NAME_LEN};
pub use hooks::QuadModeHooks;
