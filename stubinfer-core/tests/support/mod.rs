//! Builds small type-checked syntax trees for inference tests.
//!
//! Nodes must be created in source order: every leaf takes the next free
//! byte range and composite nodes span their children.

#![allow(dead_code)]

use std::sync::Arc;

use stubinfer_core::{
    analyze, enclosing_path, infer, AssignStatement, Block, CallExpression, Declaration, ExprId,
    Expression, ExpressionKind, ExpressionStatement, Field, File, FunctionDeclaration,
    FunctionLiteral, FunctionSignature, Identifier, Inference, ReturnStatement, SourceId,
    SourceMap, Span, Statement, StubInfo, Type, TypeId, TypeInfo, UnaryExpression, UnaryOperator,
    ValueSpec, VarDeclaration,
};

pub struct Fixture {
    pub info: TypeInfo,
    pub source_map: Arc<SourceMap>,
    next_id: u32,
    cursor: usize,
}

impl Fixture {
    pub fn new() -> Self {
        let mut source_map = SourceMap::new();
        source_map.add("main.go", String::new());
        Self {
            info: TypeInfo::new(),
            source_map: Arc::new(source_map),
            next_id: 0,
            cursor: 0,
        }
    }

    fn fresh_id(&mut self) -> ExprId {
        self.next_id += 1;
        ExprId(self.next_id)
    }

    fn leaf_span(&mut self, len: usize) -> Span {
        let span = Span::new(self.cursor, self.cursor + len.max(1));
        self.cursor = span.end + 1;
        span
    }

    /// Span covering `spans`, closed one byte after the last of them.
    fn enclosing(&mut self, spans: impl IntoIterator<Item = Span>) -> Span {
        let start = spans.into_iter().map(|span| span.start).min();
        let span = Span::new(start.unwrap_or(self.cursor), self.cursor);
        self.cursor = span.end + 1;
        span
    }

    // Types

    pub fn interface(&mut self, scope: &str, name: &str) -> TypeId {
        let string = self.info.basic(stubinfer_core::BasicKind::String);
        let method = self.info.signature(Vec::new(), vec![string], false);
        let structure = self.info.interface(vec![("Describe", method)]);
        self.info.named(Some(scope), name, structure)
    }

    pub fn structure(&mut self, scope: &str, name: &str) -> TypeId {
        let structure = self.info.insert(Type::Struct(Vec::new()));
        self.info.named(Some(scope), name, structure)
    }

    // Expressions

    pub fn name(&mut self, name: &str) -> Identifier {
        Identifier {
            id: self.fresh_id(),
            name: name.to_string(),
            span: self.leaf_span(name.len()),
        }
    }

    pub fn ident(&mut self, name: &str) -> Expression {
        Expression {
            id: self.fresh_id(),
            span: self.leaf_span(name.len()),
            kind: ExpressionKind::Identifier(name.to_string()),
        }
    }

    /// Identifier recorded as a value of type `ty`.
    pub fn value(&mut self, name: &str, ty: TypeId) -> Expression {
        let expression = self.ident(name);
        self.info.record(expression.id, ty);
        expression
    }

    /// Identifier recorded as naming the type `ty`.
    pub fn type_ref(&mut self, name: &str, ty: TypeId) -> Expression {
        let expression = self.ident(name);
        self.info.record_type_expr(expression.id, ty);
        expression
    }

    pub fn address_of(&mut self, operand: Expression, ty: TypeId) -> Expression {
        let span = self.enclosing([operand.span]);
        let expression = Expression {
            id: self.fresh_id(),
            span,
            kind: ExpressionKind::Unary(UnaryExpression {
                operator: UnaryOperator::Address,
                operand: Box::new(operand),
            }),
        };
        self.info.record(expression.id, ty);
        expression
    }

    pub fn call(
        &mut self,
        callee: Expression,
        arguments: Vec<Expression>,
        ty: Option<TypeId>,
    ) -> Expression {
        self.build_call(callee, arguments, ty, false)
    }

    pub fn call_spread(
        &mut self,
        callee: Expression,
        arguments: Vec<Expression>,
        ty: Option<TypeId>,
    ) -> Expression {
        self.build_call(callee, arguments, ty, true)
    }

    fn build_call(
        &mut self,
        callee: Expression,
        arguments: Vec<Expression>,
        ty: Option<TypeId>,
        has_ellipsis: bool,
    ) -> Expression {
        let span = self.enclosing(
            std::iter::once(callee.span).chain(arguments.iter().map(|argument| argument.span)),
        );
        let expression = Expression {
            id: self.fresh_id(),
            span,
            kind: ExpressionKind::Call(CallExpression {
                callee: Box::new(callee),
                arguments,
                has_ellipsis,
            }),
        };
        if let Some(ty) = ty {
            self.info.record(expression.id, ty);
        }
        expression
    }

    pub fn function_literal(
        &mut self,
        signature: FunctionSignature,
        body: Block,
        recorded: bool,
    ) -> Expression {
        let span = self.enclosing([signature.span, body.span]);
        let expression = Expression {
            id: self.fresh_id(),
            span,
            kind: ExpressionKind::FunctionLiteral(FunctionLiteral { signature, body }),
        };
        if recorded {
            let ty = self.info.signature(Vec::new(), Vec::new(), false);
            self.info.record(expression.id, ty);
        }
        expression
    }

    // Statements

    pub fn value_spec(
        &mut self,
        names: Vec<Identifier>,
        type_expr: Option<Expression>,
        values: Vec<Expression>,
    ) -> ValueSpec {
        let spans: Vec<Span> = names
            .iter()
            .map(|name| name.span)
            .chain(type_expr.iter().map(|expr| expr.span))
            .chain(values.iter().map(|value| value.span))
            .collect();
        ValueSpec {
            span: self.enclosing(spans),
            names,
            type_expr,
            values,
        }
    }

    pub fn var_declaration(&mut self, specs: Vec<ValueSpec>) -> VarDeclaration {
        let span = self.enclosing(specs.iter().map(|spec| spec.span).collect::<Vec<_>>());
        VarDeclaration { span, specs }
    }

    pub fn var_statement(&mut self, specs: Vec<ValueSpec>) -> Statement {
        Statement::Var(self.var_declaration(specs))
    }

    pub fn assign(&mut self, lhs: Vec<Expression>, rhs: Vec<Expression>) -> Statement {
        let spans: Vec<Span> = lhs.iter().chain(rhs.iter()).map(|expr| expr.span).collect();
        Statement::Assign(AssignStatement {
            span: self.enclosing(spans),
            lhs,
            rhs,
            define: false,
        })
    }

    pub fn return_statement(&mut self, results: Vec<Expression>) -> Statement {
        let spans: Vec<Span> = results.iter().map(|expr| expr.span).collect();
        Statement::Return(ReturnStatement {
            span: self.enclosing(spans),
            results,
        })
    }

    pub fn expression_statement(&mut self, expression: Expression) -> Statement {
        Statement::Expression(ExpressionStatement { expression })
    }

    pub fn block(&mut self, statements: Vec<Statement>) -> Block {
        let spans: Vec<Span> = statements.iter().map(Statement::span).collect();
        Block {
            span: self.enclosing(spans),
            statements,
        }
    }

    // Declarations

    pub fn field(&mut self, names: Vec<Identifier>, type_expr: Expression) -> Field {
        let spans: Vec<Span> = names
            .iter()
            .map(|name| name.span)
            .chain(std::iter::once(type_expr.span))
            .collect();
        Field {
            span: self.enclosing(spans),
            names,
            type_expr,
        }
    }

    pub fn signature(&mut self, parameters: Vec<Field>, results: Vec<Field>) -> FunctionSignature {
        let spans: Vec<Span> = parameters
            .iter()
            .chain(results.iter())
            .map(|field| field.span)
            .collect();
        FunctionSignature {
            span: self.enclosing(spans),
            parameters,
            results,
        }
    }

    pub fn function(
        &mut self,
        name: Identifier,
        signature: FunctionSignature,
        body: Block,
        defined: bool,
    ) -> Declaration {
        if defined {
            let ty = self.info.signature(Vec::new(), Vec::new(), false);
            self.info.define(name.id, ty);
        }
        let span = self.enclosing([name.span, signature.span, body.span]);
        Declaration::Function(FunctionDeclaration {
            span,
            name,
            signature,
            body: Some(body),
        })
    }

    pub fn file(&mut self, declarations: Vec<Declaration>) -> File {
        File {
            source: SourceId(0),
            scope: "main".to_string(),
            span: Span::new(0, self.cursor),
            declarations,
        }
    }

    // Queries

    pub fn analyze(&self, file: &File, pos: usize) -> Inference {
        let path = enclosing_path(file, pos);
        analyze(&self.source_map, &self.info, &path, pos)
    }

    pub fn infer(&self, file: &File, pos: usize) -> Option<StubInfo> {
        let path = enclosing_path(file, pos);
        infer(&self.source_map, &self.info, &path, pos)
    }
}

/// Closes a recorded function around `statements` and wraps it in a file.
/// `name` and `signature` must have been built before the statements.
pub fn function_file(
    fx: &mut Fixture,
    name: Identifier,
    signature: FunctionSignature,
    statements: Vec<Statement>,
) -> File {
    let body = fx.block(statements);
    let function = fx.function(name, signature, body, true);
    fx.file(vec![function])
}
