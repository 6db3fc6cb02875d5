//! Reusable UI pieces that are not tied to a single screen

pub mod keybindings;
