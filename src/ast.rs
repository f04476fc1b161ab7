//! The resolver's syntax tree.
//!
//! A small tagged union over the node categories the resolver cares about.
//! Everything else is an `Other` node that only carries its children, so a
//! grammar can be lowered into this shape without mirroring its full node set.

use crate::grammar::ScriptLanguage;
use crate::types::Extent;

/// A syntax tree node. Every node carries an extent; composite nodes carry
/// their children in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// A command invocation. The first element is the command name token.
    Command {
        /// Command name followed by its parameters and arguments.
        elements: Vec<Ast>,
        /// Span of the whole invocation.
        extent: Extent,
    },
    /// A function (or filter/workflow) definition.
    FunctionDefinition {
        /// Statements inside the definition.
        body: Vec<Ast>,
        /// Span of the whole declaration, keyword through closing brace.
        extent: Extent,
        /// Grammar the declaration was written in; decides its quoting rules.
        language: ScriptLanguage,
        /// Declared function name.
        name: String,
    },
    /// Any node the resolver does not intercept.
    Other {
        /// Child nodes in source order.
        children: Vec<Ast>,
        /// Span of the node.
        extent: Extent,
        /// Grammar node kind, kept for debugging output.
        label: String,
    },
    /// A command parameter token such as `-Path`.
    Parameter {
        /// Span of the parameter token.
        extent: Extent,
        /// Parameter token text including its leading dash.
        name: String,
    },
    /// A variable reference such as `$x`.
    Variable {
        /// Span of the variable token.
        extent: Extent,
        /// Variable name without sigil or braces.
        name: String,
    },
}

impl Ast {
    /// Children visited after the node itself. Parameters and variables
    /// have none.
    pub fn children(&self) -> &[Ast] {
        return match self {
            Ast::Command { elements, .. } => elements,
            Ast::FunctionDefinition { body, .. } => body,
            Ast::Other { children, .. } => children,
            Ast::Parameter { .. } | Ast::Variable { .. } => &[],
        };
    }

    /// The node's own span.
    pub const fn extent(&self) -> &Extent {
        return match self {
            Ast::Command { extent, .. }
            | Ast::FunctionDefinition { extent, .. }
            | Ast::Other { extent, .. }
            | Ast::Parameter { extent, .. }
            | Ast::Variable { extent, .. } => extent,
        };
    }

    /// Short node-kind name for log output. `Other` nodes report their
    /// grammar label.
    pub fn kind_name(&self) -> &str {
        return match self {
            Ast::Command { .. } => "command",
            Ast::FunctionDefinition { .. } => "function_definition",
            Ast::Other { label, .. } => label.as_str(),
            Ast::Parameter { .. } => "parameter",
            Ast::Variable { .. } => "variable",
        };
    }

    /// Total number of nodes in this subtree, including the node itself.
    pub fn node_count(&self) -> usize {
        return self
            .children()
            .iter()
            .map(Ast::node_count)
            .fold(1_usize, usize::saturating_add);
    }
}
