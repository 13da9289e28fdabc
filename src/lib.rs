//! Sandfall: a falling-block puzzle whose locked pieces turn into sand.
//!
//! The [`game`] module is the whole engine. Hosts drive a [`Session`] with
//! [`Session::on_tick`] and the `request_*` commands, and read the grid,
//! active piece and score back for drawing.

pub mod game;

pub use game::{
    ActivePiece, Cell, ColorId, ConfigError, Direction, Grid, Session, SessionConfig, Shape,
    ShapeKind,
};
