//! Terminal interaction: progress lines, next-step hints and confirmations
//!
//! Progress lines go to stdout and are dropped under `--quiet`. Diagnostics
//! are not printed here; they go through `tracing`.

pub mod display;
pub mod prompt;

pub use display::{Console, NextStep};
pub use prompt::{InquirePrompt, Prompt};

#[cfg(test)]
pub use prompt::ScriptedPrompt;
