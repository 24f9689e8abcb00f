//! Session module - terminal session state and its render surface
//!
//! - `session`: `TerminalSession` and `SessionPhase`
//! - `surface`: `RenderSurface` output buffer

mod session;
mod surface;


pub use session::{SessionPhase, TerminalSession};
pub use surface::{RenderSurface, DEFAULT_SCROLLBACK_BYTES};
