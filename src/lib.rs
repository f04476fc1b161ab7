//! Resolve the symbol under a cursor position in PowerShell and Bash scripts.
//!
//! Scripts are parsed with tree-sitter and lowered into a small [`Ast`];
//! [`find_symbol_at`] then walks it depth-first and reports the first
//! command name, function definition, parameter, or variable whose extent
//! contains the position.

pub mod ast;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod info;
pub mod locator;
pub mod resolver;
pub mod syntax;
pub mod types;

pub use ast::Ast;
pub use error::Error;
pub use grammar::ScriptLanguage;
pub use resolver::{PositionQuery, collect_symbols, find_symbol_at, find_symbol_at_observed, resolve_source};
pub use types::{Extent, Position, SymbolKind, SymbolReference};
