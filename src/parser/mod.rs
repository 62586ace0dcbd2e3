// Plotting pipeline DSL parser

pub mod ast;
pub mod call;
pub mod lexer;
pub mod pipeline;

// Public API re-exports
pub use ast::{Arg, ArgValue, Call, Script};
pub use pipeline::parse_script;
