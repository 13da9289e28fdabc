//! Game core: grid, pieces, collision, sand settling, line clears, session.

pub mod collision;
pub mod error;
pub mod grid;
pub mod lines;
pub mod piece;
pub mod sand;
pub mod session;

pub use collision::{hard_drop, is_valid};
pub use error::ConfigError;
pub use grid::{Cell, ColorId, Grid};
pub use lines::{ClearReport, ClearRule, clear_lines};
pub use piece::{ActivePiece, Shape, ShapeKind};
pub use sand::SandSimulator;
pub use session::{Direction, Session, SessionConfig};
