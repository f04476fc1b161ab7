//! Parser boundary: tree-sitter parsing and lowering into the resolver tree.
//!
//! Each grammar names its nodes differently; lowering maps the handful of
//! kinds the resolver intercepts (commands, function definitions, command
//! parameters, variables) and keeps everything else as transparent `Other`
//! nodes. Comments are dropped. Extents are converted to 1-based lines and
//! columns, with columns counted in bytes.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::ast::Ast;
use crate::error::Error;
use crate::grammar::ScriptLanguage;
use crate::types::Extent;

/// Default maximum script size (16 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// Per-parse lowering context.
struct Lowering<'a> {
    /// Script file recorded on every extent.
    file: &'a Path,
    /// Grammar the tree was parsed with.
    language: ScriptLanguage,
    /// Source bytes the tree points into.
    source: &'a [u8],
}

impl Lowering<'_> {
    /// Extent of `node`, carrying its source text when `with_text` is set.
    fn extent(&self, node: Node<'_>, with_text: bool) -> Extent {
        let start = node.start_position();
        let end = node.end_position();
        let text = with_text.then(|| return self.text(node).to_string());

        return Extent {
            end_column: one_based(end.column),
            end_line: one_based(end.row),
            file: Some(self.file.to_path_buf()),
            start_column: one_based(start.column),
            start_line: one_based(start.row),
            text,
        };
    }

    /// Lower any node. Leaves keep their text.
    fn lower(&self, node: Node<'_>) -> Ast {
        let lowered = match self.language {
            ScriptLanguage::Bash => self.lower_bash(node),
            ScriptLanguage::PowerShell => self.lower_powershell(node),
        };
        return lowered.unwrap_or_else(|| return self.lower_other(node));
    }

    /// Bash-specific kinds; `None` falls back to a transparent node.
    fn lower_bash(&self, node: Node<'_>) -> Option<Ast> {
        return match node.kind() {
            "command" => Some(self.lower_bash_command(node)),
            "function_definition" => self.lower_bash_function(node),
            "simple_expansion" | "expansion" | "variable_name" => Some(Ast::Variable {
                extent: self.extent(node, true),
                name: bash_variable_name(node, self.source),
            }),
            _ => None,
        };
    }

    /// `name arg...`: the command name comes first; dash-prefixed words are parameters.
    fn lower_bash_command(&self, node: Node<'_>) -> Ast {
        let name_node = node.child_by_field_name("name");
        let mut elements: Vec<Ast> = name_node
            .map(|name| return self.lower_command_name(name))
            .into_iter()
            .collect();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child) == name_node || is_comment(child) {
                continue;
            }
            let text = self.text(child);
            if child.kind() == "word" && text.len() > 1 && text.starts_with('-') {
                elements.push(Ast::Parameter {
                    extent: self.extent(child, true),
                    name: text.to_string(),
                });
            } else {
                elements.push(self.lower(child));
            }
        }

        return Ast::Command {
            elements,
            extent: self.extent(node, false),
        };
    }

    /// `name() { ... }` or `function name { ... }`.
    fn lower_bash_function(&self, node: Node<'_>) -> Option<Ast> {
        let name_node = node.child_by_field_name("name")?;
        let mut cursor = node.walk();
        let body = node
            .named_children(&mut cursor)
            .filter(|child| return *child != name_node && !is_comment(*child))
            .map(|child| return self.lower(child))
            .collect();

        return Some(Ast::FunctionDefinition {
            body,
            extent: self.extent(node, true),
            language: self.language,
            name: self.text(name_node).to_string(),
        });
    }


    /// Lower named, non-comment children in source order.
    fn lower_children(&self, node: Node<'_>) -> Vec<Ast> {
        let mut cursor = node.walk();
        return node
            .named_children(&mut cursor)
            .filter(|child| return !is_comment(*child))
            .map(|child| return self.lower(child))
            .collect();
    }

    /// A node with text attached whatever its shape; used for command names.
    fn lower_command_name(&self, node: Node<'_>) -> Ast {
        return Ast::Other {
            children: self.lower_children(node),
            extent: self.extent(node, true),
            label: node.kind().to_string(),
        };
    }

    /// Transparent node; only its children matter.
    fn lower_other(&self, node: Node<'_>) -> Ast {
        return Ast::Other {
            children: self.lower_children(node),
            extent: self.extent(node, node.named_child_count() == 0),
            label: node.kind().to_string(),
        };
    }

    /// PowerShell-specific kinds; `None` falls back to a transparent node.
    fn lower_powershell(&self, node: Node<'_>) -> Option<Ast> {
        return match node.kind() {
            "command" => Some(self.lower_powershell_command(node)),
            "command_parameter" => Some(Ast::Parameter {
                extent: self.extent(node, true),
                name: self.text(node).to_string(),
            }),
            "function_statement" => self.lower_powershell_function(node),
            "variable" => Some(Ast::Variable {
                extent: self.extent(node, true),
                name: powershell_variable_name(self.text(node)),
            }),
            _ => None,
        };
    }

    /// Command name first, then the flattened `command_elements` list.
    fn lower_powershell_command(&self, node: Node<'_>) -> Ast {
        let name_node = node
            .child_by_field_name("command_name")
            .or_else(|| return find_named_child(node, &["command_name", "command_name_expr"]));
        let mut elements: Vec<Ast> = name_node
            .map(|name| return self.lower_command_name(name))
            .into_iter()
            .collect();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child) == name_node || is_comment(child) {
                continue;
            }
            if child.kind() == "command_elements" {
                let mut inner = child.walk();
                elements.extend(
                    child
                        .named_children(&mut inner)
                        .filter(|element| {
                            return element.kind() != "command_argument_sep" && !is_comment(*element);
                        })
                        .map(|element| return self.lower(element)),
                );
            } else {
                elements.push(self.lower(child));
            }
        }

        return Ast::Command {
            elements,
            extent: self.extent(node, false),
        };
    }

    /// `function Name { ... }`, `filter Name { ... }`, `workflow Name { ... }`.
    fn lower_powershell_function(&self, node: Node<'_>) -> Option<Ast> {
        let name_node = find_named_child(node, &["function_name"])?;
        let mut cursor = node.walk();
        let body = node
            .named_children(&mut cursor)
            .filter(|child| return *child != name_node && !is_comment(*child))
            .map(|child| return self.lower(child))
            .collect();

        return Some(Ast::FunctionDefinition {
            body,
            extent: self.extent(node, true),
            language: self.language,
            name: self.text(name_node).to_string(),
        });
    }

    /// Source text of `node`; empty if it is not valid UTF-8.
    fn text(&self, node: Node<'_>) -> &str {
        return node.utf8_text(self.source).unwrap_or("");
    }

}

/// Variable name of a Bash `$x`, `${x...}`, `${arr[i]}`, or bare `x`
/// (assignment target).
fn bash_variable_name(node: Node<'_>, source: &[u8]) -> String {
    if matches!(node.kind(), "variable_name" | "special_variable_name") {
        return node.utf8_text(source).unwrap_or("").to_string();
    }
    if let Some(inner) = find_variable_name_node(node) {
        return inner.utf8_text(source).unwrap_or("").to_string();
    }
    let bare = node
        .utf8_text(source)
        .unwrap_or("")
        .trim_start_matches('$')
        .trim_start_matches('{');
    return identifier_prefix(bare).to_string();
}

/// First named child whose kind is one of `kinds`.
fn find_named_child<'tree>(node: Node<'tree>, kinds: &[&str]) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    return node
        .named_children(&mut cursor)
        .find(|child| return kinds.contains(&child.kind()));
}

/// First `variable_name` or `special_variable_name` below `node`, in pre-order.
///
/// Reaches through `subscript` and operator forms such as `${x:-default}`.
fn find_variable_name_node<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if matches!(child.kind(), "variable_name" | "special_variable_name") {
            return Some(child);
        }
        if let Some(found) = find_variable_name_node(child) {
            return Some(found);
        }
    }
    return None;
}

/// Leading identifier of `text`.
///
/// Falls back to the first character for special parameters such as `@`.
fn identifier_prefix(text: &str) -> &str {
    let end = text
        .find(|c: char| return !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if end > 0 {
        return text.get(..end).unwrap_or(text);
    }
    let first = text.chars().next().map_or(0, char::len_utf8);
    return text.get(..first).unwrap_or("");
}

/// Comments never hold symbols.
fn is_comment(node: Node<'_>) -> bool {
    return node.kind() == "comment";
}

/// Convert a 0-based tree-sitter coordinate to 1-based.
fn one_based(value: usize) -> u32 {
    return u32::try_from(value).unwrap_or(u32::MAX).saturating_add(1);
}

/// Parse a script and lower it into the resolver tree.
///
/// Syntax errors do not fail the parse: tree-sitter recovers, and the
/// resolver walks whatever structure it produced.
///
/// # Errors
///
/// Returns `Error::FileTooLarge` if the source exceeds `max_bytes`,
/// or `Error::ParseFailed` if tree-sitter cannot parse the source.
pub fn parse_script(
    file_path: &Path,
    source: &str,
    language: ScriptLanguage,
    max_bytes: u64,
) -> Result<Ast, Error> {
    let source_len: u64 = source.len().try_into().unwrap_or(u64::MAX);
    if source_len > max_bytes {
        return Err(Error::FileTooLarge {
            file: file_path.to_path_buf(),
            max_bytes,
            size_bytes: source_len,
        });
    }

    let tree = parse_source(file_path, source, &language.tree_sitter_language())?;
    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!(file = %file_path.display(), "syntax errors present, lowering recovered tree");
    }

    let lowering = Lowering {
        file: file_path,
        language,
        source: source.as_bytes(),
    };
    let ast = lowering.lower(root);
    tracing::debug!(
        file = %file_path.display(),
        language = language.name(),
        nodes = ast.node_count(),
        "parsed script"
    );
    return Ok(ast);
}

/// Parse source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_source(file_path: &Path, source: &str, language: &Language) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| return Error::ParseFailed {
        file: file_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    return parser.parse(source, None).ok_or_else(|| return Error::ParseFailed {
        file: file_path.to_path_buf(),
        reason: "tree-sitter returned None".to_string(),
    });
}

/// Strip the sigil and braces from `$x`, `@splat`, or `${name}`.
fn powershell_variable_name(text: &str) -> String {
    let bare = text.trim_start_matches(['$', '@']);
    let bare = bare
        .strip_prefix('{')
        .and_then(|inner| return inner.strip_suffix('}'))
        .unwrap_or(bare);
    return bare.to_string();
}
