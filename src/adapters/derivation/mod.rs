//! Derivation engine adapters.

mod scripted;
mod single_pass;

pub use scripted::ScriptedEngine;
pub use single_pass::SinglePassEngine;
