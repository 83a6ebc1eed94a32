//! High-level operations.
//!
//! This module contains the implementation of ninjagen commands.

pub mod generate;
pub mod linkplan;

pub use generate::{generate, GenerateOptions, GenerateResult, COMPILE_COMMANDS_NAME};
pub use linkplan::{format_plan, link_plan, LinkPlan};
