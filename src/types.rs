/// Core value types shared by the parser boundary, resolver, and CLI.
use std::path::PathBuf;

use serde::Serialize;

/// A 1-based source span. Produced by the parser boundary for every node,
/// and synthesized by the resolver when a function definition is narrowed
/// to its name token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extent {
    /// One-based column just past the last character of the span.
    pub end_column: u32,
    /// One-based line of the last character of the span.
    pub end_line: u32,
    /// Script file the span belongs to, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// One-based column of the first character.
    pub start_column: u32,
    /// One-based line of the first character.
    pub start_line: u32,
    /// Raw source text covered by the span.
    #[serde(skip)]
    pub text: Option<String>,
}

impl Extent {
    /// Whether `position` falls inside this extent.
    ///
    /// Only the start line is compared: a span covering lines 2-5 matches
    /// positions on line 2 alone.
    pub const fn contains(&self, position: Position) -> bool {
        return self.start_line == position.line
            && self.start_column <= position.column
            && self.end_column >= position.column;
    }

    /// A span that can never contain a valid 1-based position.
    pub const fn is_degenerate(&self) -> bool {
        return self.start_line == 0 || self.start_column == 0 || self.end_column < self.start_column;
    }

    /// A span on a single line with no text or file attached.
    pub const fn on_line(line: u32, start_column: u32, end_column: u32) -> Self {
        return Self {
            end_column,
            end_line: line,
            file: None,
            start_column,
            start_line: line,
            text: None,
        };
    }

    /// The same span with its source text dropped.
    pub fn without_text(&self) -> Self {
        return Self {
            end_column: self.end_column,
            end_line: self.end_line,
            file: self.file.clone(),
            start_column: self.start_column,
            start_line: self.start_line,
            text: None,
        };
    }
}

/// A 1-based cursor location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// One-based column.
    pub column: u32,
    /// One-based line.
    pub line: u32,
}

impl Position {
    /// Build a position from a line and column.
    pub const fn new(line: u32, column: u32) -> Self {
        return Self { column, line };
    }
}

/// The kinds of symbol the resolver can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A command invocation or function definition.
    Function,
    /// A command parameter token such as `-Path`.
    Parameter,
    /// A variable reference such as `$x`.
    Variable,
}

impl SymbolKind {
    /// Human-readable label used in text output.
    pub const fn label(self) -> &'static str {
        return match self {
            SymbolKind::Function => "function",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Variable => "variable",
        };
    }
}

/// The symbol token found at a query position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolReference {
    /// Span the match was made against.
    pub extent: Extent,
    /// What kind of symbol this is.
    pub kind: SymbolKind,
    /// Display name: command name, declared function name, parameter token, or variable name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_both_columns() {
        let extent = Extent::on_line(1, 1, 9);
        assert!(extent.contains(Position::new(1, 1)));
        assert!(extent.contains(Position::new(1, 9)));
        assert!(!extent.contains(Position::new(1, 10)));
    }

    #[test]
    fn multi_line_extent_matches_only_its_start_line() {
        let extent = Extent {
            end_column: 20,
            end_line: 5,
            file: None,
            start_column: 3,
            start_line: 2,
            text: None,
        };
        assert!(extent.contains(Position::new(2, 10)));
        assert!(!extent.contains(Position::new(3, 10)));
        assert!(!extent.contains(Position::new(5, 10)));
    }

    #[test]
    fn degenerate_extent_contains_nothing() {
        let extent = Extent::on_line(0, 0, 0);
        assert!(extent.is_degenerate());
        assert!(!extent.contains(Position::new(1, 1)));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&SymbolKind::Parameter).unwrap();
        assert_eq!(json, "\"parameter\"");
    }
}
