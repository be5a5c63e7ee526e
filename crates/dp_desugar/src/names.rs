//! Fresh names for the `this`/`arguments` captures.

use std::collections::HashSet;

use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitWith};

/// Names the arrow pass binds captured `this` and `arguments` to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    pub this: String,
    pub arguments: String,
}

impl Captures {
    /// Picks `_this` and `_arguments`, adding a numeric suffix when the
    /// program already uses the name anywhere.
    pub fn fresh_for(program: &ast::Program) -> Self {
        let mut collector = IdentCollector::default();
        program.visit_with(&mut collector);

        Self {
            this: unused(&collector.names, "_this"),
            arguments: unused(&collector.names, "_arguments"),
        }
    }

    /// Whether `name` is one of the capture bindings.
    pub fn contains(&self, name: &str) -> bool {
        self.this == name || self.arguments == name
    }
}

fn unused(taken: &HashSet<String>, base: &str) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[derive(Default)]
struct IdentCollector {
    names: HashSet<String>,
}

impl Visit for IdentCollector {
    fn visit_ident(&mut self, node: &ast::Ident) {
        self.names.insert(node.sym.to_string());
    }
}
