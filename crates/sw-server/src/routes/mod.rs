//! Route handlers, grouped by surface.

pub mod control;
pub mod health;
pub mod local;
pub mod playlists;
pub mod youtube;
