//! Command interpreter: tokenizing, the command table and dispatch

mod interpreter;
pub mod parse;
pub mod table;

pub use interpreter::{Flow, Interpreter};
pub use table::{CommandId, CommandSpec, CommandTable, PlaylistFlag};
