//! CLI commands for posref: at, symbols.

use std::path::Path;
use std::process::ExitCode;

use crate::config::Config;
use crate::error::Error;
use crate::grammar::{self, ScriptLanguage};
use crate::resolver::{self, PositionQuery};
use crate::syntax;
use crate::types::{Position, SymbolReference};

/// Resolve one position and print the symbol found there.
/// Exits 0 when a symbol is found and 1 when there is none.
///
/// # Errors
///
/// Returns `Error::InvalidPosition` for a zero line or column, plus any
/// config, file, language, or parse error.
pub fn at(file: &Path, line: u32, column: u32, full_definition: bool, json: bool) -> Result<ExitCode, Error> {
    if line == 0 || column == 0 {
        return Err(Error::InvalidPosition { column, line });
    }

    let config = Config::load(Path::new("."))?;
    let (language, source) = read_script(file, &config)?;
    let query = PositionQuery {
        include_function_definition_body: full_definition || config.full_definition,
        position: Position::new(line, column),
    };
    let found = resolver::resolve_source(file, &source, language, config.max_file_bytes, query)?;

    if json {
        // serde_json::to_string_pretty won't fail on this structure.
        let out = serde_json::to_string_pretty(&found).unwrap_or_default();
        println!("{out}");
    } else if let Some(reference) = &found {
        println!("{}", format_reference(reference, file));
    } else {
        println!("No symbol at {}:{line}:{column}", file.display());
    }

    return match found {
        None => Ok(ExitCode::from(1)),
        Some(_) => Ok(ExitCode::SUCCESS),
    };
}

/// `kind name file:line:col-line:col`
fn format_reference(reference: &SymbolReference, file: &Path) -> String {
    let extent = &reference.extent;
    let shown = extent.file.as_deref().unwrap_or(file);
    return format!(
        "{:<9} {} {}:{}:{}-{}:{}",
        reference.kind.label(),
        reference.name,
        shown.display(),
        extent.start_line,
        extent.start_column,
        extent.end_line,
        extent.end_column,
    );
}

/// Detect the script's language and read its source.
///
/// # Errors
///
/// Returns `Error::UnsupportedLanguage`, `Error::FileNotFound`, or `Error::Io`.
fn read_script(file: &Path, config: &Config) -> Result<(ScriptLanguage, String), Error> {
    let language = grammar::language_for_path(file, &config.extensions)?;
    let source = std::fs::read_to_string(file).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            return Error::FileNotFound {
                path: file.to_path_buf(),
            };
        }
        return Error::Io(e);
    })?;
    return Ok((language, source));
}

/// List every symbol in a script in traversal order.
///
/// # Errors
///
/// Returns config, file, language, or parse errors.
pub fn symbols(file: &Path, full_definition: bool, json: bool) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let (language, source) = read_script(file, &config)?;
    let tree = syntax::parse_script(file, &source, language, config.max_file_bytes)?;
    let found = resolver::collect_symbols(&tree, full_definition || config.full_definition);

    if json {
        // serde_json::to_string_pretty won't fail on this structure.
        let out = serde_json::to_string_pretty(&found).unwrap_or_default();
        println!("{out}");
    } else {
        for reference in &found {
            println!("{}", format_reference(reference, file));
        }
    }

    return Ok(ExitCode::SUCCESS);
}
