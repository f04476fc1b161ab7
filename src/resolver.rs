use std::path::Path;

use crate::ast::Ast;
use crate::error::Error;
use crate::grammar::ScriptLanguage;
use crate::locator::locate_name;
use crate::syntax;
use crate::types::{Extent, Position, SymbolKind, SymbolReference};

/// Outcome of visiting one subtree.
#[derive(Debug)]
enum Flow {
    /// Nothing matched; keep walking.
    Continue,
    /// A symbol contains the query position; stop the whole walk.
    Found(SymbolReference),
}

/// Parameters of a single position lookup.
#[derive(Debug, Clone, Copy)]
pub struct PositionQuery {
    /// Match function definitions on their whole declaration instead of the name token.
    pub include_function_definition_body: bool,
    /// Cursor location to resolve.
    pub position: Position,
}

/// The symbol an intercepted node would report, with its matching extent.
/// `None` for nodes the resolver does not test.
fn candidate_symbol(node: &Ast, include_body: bool) -> Option<SymbolReference> {
    return match node {
        Ast::Command { elements, .. } => {
            let command_name = elements.first()?.extent();
            if command_name.is_degenerate() {
                return None;
            }
            Some(SymbolReference {
                extent: command_name.clone(),
                kind: SymbolKind::Function,
                name: command_name.text.clone().unwrap_or_default(),
            })
        },
        Ast::FunctionDefinition {
            extent, language, name, ..
        } => {
            let matching = if include_body {
                extent.without_text()
            } else {
                function_name_extent(name, extent, *language).unwrap_or_else(|| return extent.without_text())
            };
            Some(SymbolReference {
                extent: matching,
                kind: SymbolKind::Function,
                name: name.clone(),
            })
        },
        Ast::Other { .. } => None,
        Ast::Parameter { extent, name } => Some(SymbolReference {
            extent: extent.clone(),
            kind: SymbolKind::Parameter,
            name: name.clone(),
        }),
        Ast::Variable { extent, name } => Some(SymbolReference {
            extent: extent.clone(),
            kind: SymbolKind::Variable,
            name: name.clone(),
        }),
    };
}

/// Every symbol in the tree, in traversal order, with the extents the
/// resolver would match them against.
pub fn collect_symbols(tree: &Ast, include_function_definition_body: bool) -> Vec<SymbolReference> {
    let mut symbols = Vec::new();
    collect_symbols_into(tree, include_function_definition_body, &mut symbols);
    return symbols;
}

/// Pre-order accumulation for [`collect_symbols`].
fn collect_symbols_into(node: &Ast, include_body: bool, symbols: &mut Vec<SymbolReference>) {
    if let Some(symbol) = candidate_symbol(node, include_body) {
        symbols.push(symbol);
    }
    for child in node.children() {
        collect_symbols_into(child, include_body, symbols);
    }
}

/// Find the symbol whose extent contains `(line, column)`.
///
/// Returns `None` when the position is on whitespace, in a comment, past
/// the end of the script, or otherwise not on a symbol.
pub fn find_symbol_at(
    tree: &Ast,
    line: u32,
    column: u32,
    include_function_definition_body: bool,
) -> Option<SymbolReference> {
    let query = PositionQuery {
        include_function_definition_body,
        position: Position::new(line, column),
    };
    return find_symbol_at_observed(tree, query, &mut trace_visit);
}

/// Like [`find_symbol_at`], calling `observer` once for every node visited.
pub fn find_symbol_at_observed<F: FnMut(&Ast)>(
    tree: &Ast,
    query: PositionQuery,
    observer: &mut F,
) -> Option<SymbolReference> {
    return match walk(tree, query, observer) {
        Flow::Continue => {
            tracing::debug!(line = query.position.line, column = query.position.column, "no symbol at position");
            None
        },
        Flow::Found(reference) => {
            tracing::debug!(
                kind = reference.kind.label(),
                name = %reference.name,
                line = reference.extent.start_line,
                column = reference.extent.start_column,
                "symbol found"
            );
            Some(reference)
        },
    };
}

/// Narrow a function declaration to the span of its name token.
///
/// `None` when the declaration carries no source text or the name cannot be
/// found in it; callers fall back to the whole declaration.
pub fn function_name_extent(name: &str, declaration: &Extent, language: ScriptLanguage) -> Option<Extent> {
    let text = declaration.text.as_deref()?;
    let origin = Position::new(declaration.start_line, declaration.start_column);
    let Some(start) = locate_name(text, name, origin, language) else {
        tracing::debug!(name, "function name not found in declaration text");
        return None;
    };
    let length = u32::try_from(name.len()).ok()?;

    return Some(Extent {
        end_column: start.column.saturating_add(length),
        end_line: start.line,
        file: declaration.file.clone(),
        start_column: start.column,
        start_line: start.line,
        text: Some(name.to_string()),
    });
}

/// Line-only test run before a candidate extent is built.
///
/// A name-only function match can land on any line of the declaration, so
/// functions are checked against their whole line range.
fn may_match(node: &Ast, position: Position, include_body: bool) -> bool {
    return match node {
        Ast::Command { elements, .. } => elements
            .first()
            .is_some_and(|command_name| return command_name.extent().start_line == position.line),
        Ast::FunctionDefinition { extent, .. } => {
            if include_body {
                extent.start_line == position.line
            } else {
                (extent.start_line..=extent.end_line).contains(&position.line)
            }
        },
        Ast::Other { .. } => false,
        Ast::Parameter { extent, .. } | Ast::Variable { extent, .. } => extent.start_line == position.line,
    };
}

/// Parse `source` and resolve `position` against it in one step.
///
/// # Errors
///
/// Returns `Error::FileTooLarge` if the source exceeds `max_bytes`,
/// or `Error::ParseFailed` if tree-sitter cannot parse the source.
pub fn resolve_source(
    file_path: &Path,
    source: &str,
    language: ScriptLanguage,
    max_bytes: u64,
    query: PositionQuery,
) -> Result<Option<SymbolReference>, Error> {
    let tree = syntax::parse_script(file_path, source, language, max_bytes)?;
    return Ok(find_symbol_at_observed(&tree, query, &mut trace_visit));
}

/// Observer behind the plain lookups: one `trace` event per visited node.
fn trace_visit(node: &Ast) {
    let extent = node.extent();
    tracing::trace!(
        kind = node.kind_name(),
        line = extent.start_line,
        column = extent.start_column,
        "visit"
    );
}

/// Visit `node`, then its children, stopping at the first match.
fn walk<F: FnMut(&Ast)>(node: &Ast, query: PositionQuery, observer: &mut F) -> Flow {
    observer(node);

    let include_body = query.include_function_definition_body;
    let matched = if may_match(node, query.position, include_body) {
        candidate_symbol(node, include_body).filter(|symbol| return symbol.extent.contains(query.position))
    } else {
        None
    };
    let Some(reference) = matched else {
        return walk_children(node, query, observer);
    };

    // A whole-definition extent encloses its body; a symbol found in there is more specific.
    let search_body = include_body && matches!(node, Ast::FunctionDefinition { .. });
    let nested = if search_body {
        walk_children(node, query, observer)
    } else {
        Flow::Continue
    };
    return match nested {
        Flow::Continue => Flow::Found(reference),
        Flow::Found(inner) => Flow::Found(inner),
    };
}

/// Walk children in order until one reports a match.
fn walk_children<F: FnMut(&Ast)>(node: &Ast, query: PositionQuery, observer: &mut F) -> Flow {
    for child in node.children() {
        if let Flow::Found(reference) = walk(child, query, observer) {
            return Flow::Found(reference);
        }
    }
    return Flow::Continue;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn leaf(label: &str, line: u32, start: u32, end: u32, text: &str) -> Ast {
        let mut extent = Extent::on_line(line, start, end);
        extent.text = Some(text.to_string());
        return Ast::Other {
            children: Vec::new(),
            extent,
            label: label.to_string(),
        };
    }

    fn other(label: &str, extent: Extent, children: Vec<Ast>) -> Ast {
        return Ast::Other {
            children,
            extent,
            label: label.to_string(),
        };
    }

    fn variable(line: u32, start: u32, end: u32, name: &str) -> Ast {
        return Ast::Variable {
            extent: Extent::on_line(line, start, end),
            name: name.to_string(),
        };
    }

    /// `Get-Item -Path "x"`
    fn get_item_tree() -> Ast {
        let command = Ast::Command {
            elements: vec![
                leaf("command_name", 1, 1, 9, "Get-Item"),
                Ast::Parameter {
                    extent: Extent::on_line(1, 10, 15),
                    name: "-Path".to_string(),
                },
                leaf("string", 1, 16, 19, "\"x\""),
            ],
            extent: Extent::on_line(1, 1, 19),
        };
        return other("program", Extent::on_line(1, 1, 19), vec![command]);
    }

    /// `function Foo { $x = 1 }`
    fn function_tree() -> Ast {
        let assignment = other(
            "assignment_expression",
            Extent::on_line(1, 16, 22),
            vec![variable(1, 16, 18, "x"), leaf("integer", 1, 21, 22, "1")],
        );
        let mut extent = Extent::on_line(1, 1, 24);
        extent.text = Some("function Foo { $x = 1 }".to_string());
        extent.file = Some(PathBuf::from("foo.ps1"));
        let definition = Ast::FunctionDefinition {
            body: vec![other("script_block", Extent::on_line(1, 16, 22), vec![assignment])],
            extent,
            language: ScriptLanguage::PowerShell,
            name: "Foo".to_string(),
        };
        return other("program", Extent::on_line(1, 1, 24), vec![definition]);
    }

    #[test]
    fn command_name_resolves_as_function() {
        let tree = get_item_tree();
        for column in 1..=8 {
            let found = find_symbol_at(&tree, 1, column, false).unwrap();
            assert_eq!(found.kind, SymbolKind::Function);
            assert_eq!(found.extent, {
                let mut e = Extent::on_line(1, 1, 9);
                e.text = Some("Get-Item".to_string());
                e
            });
            assert_eq!(found.name, "Get-Item");
        }
    }

    #[test]
    fn parameter_token_resolves_as_parameter() {
        let found = find_symbol_at(&get_item_tree(), 1, 10, false).unwrap();
        assert_eq!(found.kind, SymbolKind::Parameter);
        assert_eq!(found.name, "-Path");
        assert_eq!(found.extent, Extent::on_line(1, 10, 15));
    }

    #[test]
    fn argument_outside_symbols_is_none() {
        assert_eq!(find_symbol_at(&get_item_tree(), 1, 17, false), None);
    }

    #[test]
    fn name_only_policy_matches_name_token() {
        let tree = function_tree();
        for column in 10..=12 {
            let found = find_symbol_at(&tree, 1, column, false).unwrap();
            assert_eq!(found.kind, SymbolKind::Function);
            assert_eq!(found.extent.start_column, 10);
            assert_eq!(found.extent.end_column, 13);
            assert_eq!(found.extent.file, Some(PathBuf::from("foo.ps1")));
        }
    }

    #[test]
    fn name_only_policy_finds_nested_variable() {
        let found = find_symbol_at(&function_tree(), 1, 16, false).unwrap();
        assert_eq!(found.kind, SymbolKind::Variable);
        assert_eq!(found.extent, Extent::on_line(1, 16, 18));
    }

    #[test]
    fn name_only_policy_ignores_body_outside_symbols() {
        assert_eq!(find_symbol_at(&function_tree(), 1, 14, false), None);
    }

    #[test]
    fn full_definition_policy_matches_body() {
        let found = find_symbol_at(&function_tree(), 1, 14, true).unwrap();
        assert_eq!(found.kind, SymbolKind::Function);
        assert_eq!(found.extent.start_column, 1);
        assert_eq!(found.extent.end_column, 24);
    }

    #[test]
    fn full_definition_policy_prefers_nested_variable() {
        let found = find_symbol_at(&function_tree(), 1, 17, true).unwrap();
        assert_eq!(found.kind, SymbolKind::Variable);
        assert_eq!(found.name, "x");
    }

    #[test]
    fn missing_name_text_falls_back_to_declaration() {
        let definition = Ast::FunctionDefinition {
            body: Vec::new(),
            extent: Extent::on_line(1, 1, 16),
            language: ScriptLanguage::PowerShell,
            name: "Foo".to_string(),
        };
        let found = find_symbol_at(&definition, 1, 3, false).unwrap();
        assert_eq!(found.extent, Extent::on_line(1, 1, 16));
    }

    #[test]
    fn positions_off_the_tree_are_none() {
        let tree = function_tree();
        assert_eq!(find_symbol_at(&tree, 2, 1, true), None);
        assert_eq!(find_symbol_at(&tree, 1, 40, true), None);
        assert_eq!(find_symbol_at(&tree, 1, 0, true), None);
    }

    #[test]
    fn multi_line_command_matches_only_on_start_line() {
        let mut name_extent = Extent::on_line(2, 1, 30);
        name_extent.end_line = 5;
        let command = Ast::Command {
            elements: vec![other("command_name", name_extent.clone(), Vec::new())],
            extent: name_extent,
        };
        assert!(find_symbol_at(&command, 2, 10, false).is_some());
        assert_eq!(find_symbol_at(&command, 3, 10, false), None);
    }

    #[test]
    fn empty_command_descends_into_children() {
        let command = Ast::Command {
            elements: Vec::new(),
            extent: Extent::on_line(1, 1, 5),
        };
        let tree = other("program", Extent::on_line(1, 1, 5), vec![command, variable(1, 1, 3, "a")]);
        let found = find_symbol_at(&tree, 1, 2, false).unwrap();
        assert_eq!(found.kind, SymbolKind::Variable);
    }

    #[test]
    fn degenerate_command_name_descends_into_children() {
        let command = Ast::Command {
            elements: vec![other("command_name", Extent::on_line(1, 0, 0), Vec::new()), variable(1, 1, 3, "a")],
            extent: Extent::on_line(1, 1, 5),
        };
        let found = find_symbol_at(&command, 1, 2, false).unwrap();
        assert_eq!(found.kind, SymbolKind::Variable);
        assert_eq!(found.name, "a");
        assert_eq!(find_symbol_at(&command, 1, 0, false), None);
        assert_eq!(find_symbol_at(&command, 1, 4, false), None);
    }

    #[test]
    fn name_on_a_later_line_still_resolves() {
        let mut extent = Extent::on_line(1, 1, 7);
        extent.end_line = 2;
        extent.text = Some("function\nFoo {}".to_string());
        let definition = Ast::FunctionDefinition {
            body: Vec::new(),
            extent,
            language: ScriptLanguage::PowerShell,
            name: "Foo".to_string(),
        };

        let found = find_symbol_at(&definition, 2, 2, false).unwrap();
        assert_eq!(found.extent.start_line, 2);
        assert_eq!(found.extent.start_column, 1);
        assert_eq!(found.extent.end_column, 4);
        assert_eq!(find_symbol_at(&definition, 3, 2, false), None);
    }

    #[test]
    fn full_definition_extent_drops_source_text() {
        let found = find_symbol_at(&function_tree(), 1, 2, true).unwrap();
        assert_eq!(found.extent.text, None);
        assert_eq!(found.extent.file, Some(PathBuf::from("foo.ps1")));
    }

    #[test]
    fn trees_are_shared_across_threads() {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ast>();
        assert_send_sync::<SymbolReference>();

        let tree = function_tree();
        std::thread::scope(|scope| {
            let variable = scope.spawn(|| return find_symbol_at(&tree, 1, 17, true));
            let name = scope.spawn(|| return find_symbol_at(&tree, 1, 11, false));
            assert_eq!(variable.join().unwrap().unwrap().kind, SymbolKind::Variable);
            assert_eq!(name.join().unwrap().unwrap().name, "Foo");
        });
    }

    #[test]
    fn repeated_lookups_are_identical() {
        let tree = get_item_tree();
        assert_eq!(find_symbol_at(&tree, 1, 12, false), find_symbol_at(&tree, 1, 12, false));
    }

    #[test]
    fn stops_at_first_match() {
        // `a; a` where both command names sit on line 1.
        let first = Ast::Command {
            elements: vec![leaf("command_name", 1, 1, 2, "a")],
            extent: Extent::on_line(1, 1, 2),
        };
        let second = Ast::Command {
            elements: vec![leaf("command_name", 1, 4, 5, "a")],
            extent: Extent::on_line(1, 4, 5),
        };
        let tree = other("program", Extent::on_line(1, 1, 5), vec![first, second]);

        let mut visited = Vec::new();
        let query = PositionQuery {
            include_function_definition_body: false,
            position: Position::new(1, 1),
        };
        let found = find_symbol_at_observed(&tree, query, &mut |node: &Ast| {
            visited.push(node.extent().start_column);
        });

        assert_eq!(found.unwrap().extent.start_column, 1);
        assert_eq!(visited, vec![1, 1]);
    }

    #[test]
    fn exhausted_walk_visits_every_node() {
        let tree = function_tree();
        let mut count = 0_usize;
        let query = PositionQuery {
            include_function_definition_body: false,
            position: Position::new(9, 9),
        };
        let found = find_symbol_at_observed(&tree, query, &mut |_node: &Ast| count = count.saturating_add(1));
        assert_eq!(found, None);
        assert_eq!(count, tree.node_count());
    }

    #[test]
    fn collects_symbols_in_traversal_order() {
        let symbols = collect_symbols(&get_item_tree(), false);
        let kinds: Vec<SymbolKind> = symbols.iter().map(|s| return s.kind).collect();
        assert_eq!(kinds, vec![SymbolKind::Function, SymbolKind::Parameter]);

        let symbols = collect_symbols(&function_tree(), false);
        let names: Vec<&str> = symbols.iter().map(|s| return s.name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "x"]);
        assert_eq!(symbols.first().unwrap().extent.end_column, 13);
    }
}
