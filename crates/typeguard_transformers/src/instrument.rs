//! Parameter and return guards for development and strict builds.
//!
//! A function with typed parameters gets them renamed to temporaries, each
//! temporary guarded, and the original names rebound at the top of the body:
//!
//! ```text
//! function greet(__tg_p1) {
//!     if (typeof __tg_p1 !== "string") { __tg_report("name", "string", __tg_p1); }
//!     var name = __tg_p1;
//!     ...
//! }
//! ```
//!
//! `return e;` in a function with a declared return type becomes
//! `const __tg_r2 = e; <guard>; return __tg_r2;`. The return guard skips a
//! value that is `Object.is` a parameter already checked against the same
//! type, so one bad argument passed straight through is reported once.

use crate::check_compiler::CheckCompiler;
use crate::guard::{DescriptorTable, Guard, GuardNode};
use crate::names::NameGenerator;
use crate::render::render_guard;
use typeguard_ast::node::{self as ast, BindingName, Expression, Parameter, Statement};
use typeguard_ast::{NodeData, NodeFactory, SyntaxKind, VariableKind};
use typeguard_options::{Mode, DEFAULT_MAX_INLINE_DEPTH};
use typeguard_printer::type_to_string;
use typeguard_types::{Registry, Translator, TypeNode};

/// What the instrumenter needs to know about a function.
pub struct Signature<'a, 's> {
    /// Used in return-value paths; anonymous functions read `<anonymous>`.
    pub name: Option<&'s str>,
    pub type_parameters: Option<&'a [ast::TypeParameter<'a>]>,
    /// The parameters as written, `this` excluded.
    pub parameters: &'s [Parameter<'a>],
    pub return_type: Option<&'a ast::TypeNode<'a>>,
    /// Async functions and generators keep their returns unchecked.
    pub is_async_or_generator: bool,
}

/// Parameters and body prologue of an instrumented function.
pub struct FunctionEntry<'a> {
    pub parameters: Vec<Parameter<'a>>,
    pub prologue: Vec<Statement<'a>>,
}

struct ReturnCheck {
    ty: TypeNode,
    label: String,
    path: String,
}

#[derive(Default)]
struct FunctionScope {
    returns: Option<ReturnCheck>,
    /// Guarded parameter temporaries and the types they were checked against.
    checked: Vec<(String, TypeNode)>,
}

pub struct Instrumenter<'r> {
    translator: Translator<'r>,
    names: NameGenerator,
    table: DescriptorTable,
    mode: Mode,
    max_inline_depth: u32,
    functions: Vec<FunctionScope>,
    emitted: Vec<Guard>,
}

impl<'r> Instrumenter<'r> {
    pub fn new(registry: &'r Registry, mode: Mode) -> Self {
        Self {
            translator: Translator::new(registry),
            names: NameGenerator::new(),
            table: DescriptorTable::new(),
            mode,
            max_inline_depth: DEFAULT_MAX_INLINE_DEPTH,
            functions: Vec::new(),
            emitted: Vec::new(),
        }
    }

    pub fn with_max_inline_depth(mut self, depth: u32) -> Self {
        self.max_inline_depth = depth;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of guards emitted so far.
    pub fn guard_count(&self) -> usize {
        self.emitted.len()
    }

    /// The guards emitted so far, in source order.
    pub fn guards(&self) -> &[Guard] {
        &self.emitted
    }

    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn into_table(self) -> DescriptorTable {
        self.table
    }

    pub fn enter_class(&mut self, type_parameters: Option<&[ast::TypeParameter<'_>]>) {
        self.translator.push_type_parameters(type_parameters);
    }

    pub fn leave_class(&mut self) {
        self.translator.pop_type_parameters();
    }

    fn translate(&mut self, node: &ast::TypeNode<'_>) -> TypeNode {
        let ty = self.translator.translate(node);
        self.translator.take_diagnostics();
        ty
    }

    fn compile_guard(&mut self, target: &str, ty: &TypeNode, path: &str, label: &str) -> Guard {
        CheckCompiler::new(&mut self.names, &mut self.table, self.mode)
            .with_max_inline_depth(self.max_inline_depth)
            .compile_guard(target, ty, path, Some(label))
    }

    /// Render `guard`, or `None` when there is nothing to check.
    fn emit<'a>(&mut self, factory: &NodeFactory<'a>, guard: Guard) -> Option<Statement<'a>> {
        if guard.is_empty() {
            return None;
        }
        let statement = factory.verbatim(&render_guard(&guard));
        self.emitted.push(guard);
        Some(statement)
    }

    /// Start a function. `stripped` are the parameters with their types
    /// removed, in the same order as `signature.parameters`. Must be paired
    /// with [`leave_function`](Self::leave_function).
    pub fn enter_function<'a>(
        &mut self,
        factory: &NodeFactory<'a>,
        signature: &Signature<'a, '_>,
        stripped: Vec<Parameter<'a>>,
    ) -> FunctionEntry<'a> {
        self.translator.push_type_parameters(signature.type_parameters);

        let name = signature.name.unwrap_or("<anonymous>");
        let check = match signature.return_type {
            Some(node) if !signature.is_async_or_generator => {
                let ty = self.translate(node);
                Some(ReturnCheck {
                    ty,
                    label: type_to_string(node),
                    path: format!("return value of '{}'", name),
                })
            }
            _ => None,
        };
        let mut scope = FunctionScope {
            returns: check,
            checked: Vec::new(),
        };

        let mut parameters = Vec::with_capacity(stripped.len());
        let mut prologue = Vec::new();
        // Once a parameter moves into the body, later ones follow so their
        // defaults still see the rebound names.
        let mut renaming = false;
        for (i, (original, plain)) in signature.parameters.iter().zip(stripped).enumerate() {
            let guard_type = original.type_annotation.map(|node| {
                let ty = self.translate(node);
                let ty = if original.optional || original.initializer.is_some() {
                    TypeNode::optional(ty)
                } else {
                    ty
                };
                (ty, type_to_string(node))
            });
            let path = match &original.name {
                BindingName::Identifier(id) => id.name.to_string(),
                _ => format!("parameter {}", i + 1),
            };
            let temp = self.names.next("p");
            let guard = guard_type.and_then(|(ty, label)| {
                let guard = self.compile_guard(&temp, &ty, &path, &label);
                let statement = self.emit(factory, guard)?;
                scope.checked.push((temp.clone(), ty));
                Some(statement)
            });
            if guard.is_none() && !renaming {
                parameters.push(plain);
                continue;
            }
            renaming = true;
            prologue.extend(guard);
            prologue.push(rebind(factory, &plain, &temp));
            parameters.push(Parameter {
                data: NodeData::synthesized(),
                name: BindingName::Identifier(factory.identifier(&temp)),
                rest: plain.rest,
                optional: false,
                type_annotation: None,
                initializer: None,
            });
        }
        self.functions.push(scope);
        FunctionEntry { parameters, prologue }
    }

    pub fn leave_function(&mut self) {
        self.functions.pop();
        self.translator.pop_type_parameters();
    }

    /// Whether returns of the current function are guarded.
    pub fn checks_returns(&self) -> bool {
        matches!(self.functions.last(), Some(FunctionScope { returns: Some(_), .. }))
    }

    /// `const r = expr; <guard>; return r;` for a return in the current
    /// function, or `None` when it is not checked.
    pub fn guard_return<'a>(
        &mut self,
        factory: &NodeFactory<'a>,
        expr: &'a Expression<'a>,
    ) -> Option<Vec<Statement<'a>>> {
        let (ty, label, path, seen) = match self.functions.last() {
            Some(FunctionScope { returns: Some(check), checked }) => {
                let seen: Vec<String> =
                    checked.iter().filter(|(_, ty)| *ty == check.ty).map(|(temp, _)| temp.clone()).collect();
                (check.ty.clone(), check.label.clone(), check.path.clone(), seen)
            }
            _ => return None,
        };
        let temp = self.names.next("r");
        let mut guard = self.compile_guard(&temp, &ty, &path, &label);
        if !guard.is_empty() && !seen.is_empty() {
            let then = std::mem::take(&mut guard.nodes);
            guard.nodes.push(GuardNode::Unseen { var: temp.clone(), seen, then });
        }
        let guard = self.emit(factory, guard)?;
        tracing::trace!(path = %path, "return guard");
        Some(vec![
            factory.variable(VariableKind::Const, &temp, Some(expr)),
            guard,
            factory.return_statement(Some(factory.identifier_expression(&temp))),
        ])
    }
}

/// `var x = temp;`, with a parameter default applied when `temp` is
/// `undefined`.
fn rebind<'a>(factory: &NodeFactory<'a>, plain: &Parameter<'a>, temp: &str) -> Statement<'a> {
    let value = factory.identifier_expression(temp);
    let value = match plain.initializer {
        Some(init) => {
            let missing = factory.binary(
                value,
                SyntaxKind::EqualsEqualsEqualsToken,
                factory.identifier_expression("undefined"),
            );
            factory.alloc(Expression::Conditional(ast::ConditionalExpression {
                data: NodeData::synthesized(),
                condition: missing,
                when_true: init,
                when_false: value,
            }))
        }
        None => value,
    };
    factory.variable_with_binding(VariableKind::Var, plain.name, Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use typeguard_printer::Printer;

    fn parameter<'a>(factory: &NodeFactory<'a>, name: &str, init: Option<&'a Expression<'a>>) -> Parameter<'a> {
        Parameter {
            data: NodeData::synthesized(),
            name: BindingName::Identifier(factory.identifier(name)),
            rest: false,
            optional: false,
            type_annotation: None,
            initializer: init,
        }
    }

    #[test]
    fn test_rebind_applies_default() {
        let arena = Bump::new();
        let factory = NodeFactory::new(&arena);
        let plain = parameter(&factory, "b", Some(factory.numeric_literal(1.0)));
        let stmt = rebind(&factory, &plain, "__tg_p2");
        assert_eq!(
            Printer::new().print_statements(&[stmt]),
            "var b = __tg_p2 === undefined ? 1 : __tg_p2;"
        );
    }

    #[test]
    fn test_untyped_parameters_are_left_alone() {
        let arena = Bump::new();
        let factory = NodeFactory::new(&arena);
        let registry = Registry::new();
        let mut instrumenter = Instrumenter::new(&registry, Mode::Development);
        let params = [parameter(&factory, "a", None)];
        let signature = Signature {
            name: Some("f"),
            type_parameters: None,
            parameters: &params,
            return_type: None,
            is_async_or_generator: false,
        };
        let entry = instrumenter.enter_function(&factory, &signature, params.to_vec());
        assert!(entry.prologue.is_empty());
        assert!(!instrumenter.checks_returns());
        instrumenter.leave_function();
        assert_eq!(instrumenter.guard_count(), 0);
    }
}
