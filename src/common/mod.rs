//! Common utility modules shared across the installer and commands.

pub mod fs;
