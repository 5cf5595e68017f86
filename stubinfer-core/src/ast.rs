use serde::{Deserialize, Serialize};

use crate::source::SourceId;

/// Byte range of a node, both ends inclusive for containment tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Identity of an expression (type expressions and binding names included)
/// in the type-checking context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub source: SourceId,
    pub scope: String,
    pub span: Span,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    Var(VarDeclaration),
    Function(FunctionDeclaration),
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Declaration::Var(declaration) => declaration.span,
            Declaration::Function(function) => function.span,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDeclaration {
    pub span: Span,
    pub specs: Vec<ValueSpec>,
}

/// One `names [type] = values` line of a `var` group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSpec {
    pub span: Span,
    pub names: Vec<Identifier>,
    pub type_expr: Option<Expression>,
    pub values: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub span: Span,
    pub name: Identifier,
    pub signature: FunctionSignature,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub span: Span,
    pub parameters: Vec<Field>,
    pub results: Vec<Field>,
}

impl FunctionSignature {
    /// Declared result slots: a field naming several results contributes
    /// one slot per name, an unnamed field exactly one.
    pub fn result_types(&self) -> Vec<&Expression> {
        self.results
            .iter()
            .flat_map(|field| std::iter::repeat(&field.type_expr).take(field.names.len().max(1)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub span: Span,
    pub names: Vec<Identifier>,
    pub type_expr: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub id: ExprId,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Var(VarDeclaration),
    Assign(AssignStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
    Block(Block),
    If(IfStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Var(declaration) => declaration.span,
            Statement::Assign(assign) => assign.span,
            Statement::Return(ret) => ret.span,
            Statement::Expression(statement) => statement.expression.span,
            Statement::Block(block) => block.span,
            Statement::If(statement) => statement.span,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignStatement {
    pub span: Span,
    pub lhs: Vec<Expression>,
    pub rhs: Vec<Expression>,
    /// `:=` rather than `=`.
    #[serde(default)]
    pub define: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub span: Span,
    pub results: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStatement {
    pub span: Span,
    pub init: Option<Box<Statement>>,
    pub condition: Expression,
    pub consequent: Block,
    pub alternative: Option<Box<Statement>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExprId,
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    Identifier(String),
    Selector(SelectorExpression),
    Call(CallExpression),
    Unary(UnaryExpression),
    /// `*x`: a pointer type in type position, a dereference otherwise.
    Star(Box<Expression>),
    CompositeLiteral(CompositeLiteral),
    Literal(Literal),
    FunctionLiteral(FunctionLiteral),
    Paren(Box<Expression>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorExpression {
    pub object: Box<Expression>,
    pub property: Identifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    /// The final argument is spread with `...`.
    #[serde(default)]
    pub has_ellipsis: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Address,
    Negate,
    Not,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeLiteral {
    pub type_expr: Option<Box<Expression>>,
    pub elements: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Nil,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionLiteral {
    pub signature: FunctionSignature,
    pub body: Block,
}

/// One step of a syntax path, borrowing the node it names.
#[derive(Debug, Clone, Copy)]
pub enum PathNode<'a> {
    File(&'a File),
    VarDeclaration(&'a VarDeclaration),
    ValueSpec(&'a ValueSpec),
    FunctionDecl(&'a FunctionDeclaration),
    Signature(&'a FunctionSignature),
    Field(&'a Field),
    Identifier(&'a Identifier),
    Block(&'a Block),
    Assign(&'a AssignStatement),
    Return(&'a ReturnStatement),
    Statement(&'a Statement),
    Call {
        expression: &'a Expression,
        call: &'a CallExpression,
    },
    FunctionLiteral {
        expression: &'a Expression,
        literal: &'a FunctionLiteral,
    },
    Expression(&'a Expression),
}

impl PathNode<'_> {
    pub fn span(&self) -> Span {
        match self {
            PathNode::File(file) => file.span,
            PathNode::VarDeclaration(declaration) => declaration.span,
            PathNode::ValueSpec(spec) => spec.span,
            PathNode::FunctionDecl(function) => function.span,
            PathNode::Signature(signature) => signature.span,
            PathNode::Field(field) => field.span,
            PathNode::Identifier(identifier) => identifier.span,
            PathNode::Block(block) => block.span,
            PathNode::Assign(assign) => assign.span,
            PathNode::Return(ret) => ret.span,
            PathNode::Statement(statement) => statement.span(),
            PathNode::Call { expression, .. }
            | PathNode::FunctionLiteral { expression, .. }
            | PathNode::Expression(expression) => expression.span,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PathNode::File(_) => "file",
            PathNode::VarDeclaration(_) => "var declaration",
            PathNode::ValueSpec(_) => "value spec",
            PathNode::FunctionDecl(_) => "function declaration",
            PathNode::Signature(_) => "signature",
            PathNode::Field(_) => "field",
            PathNode::Identifier(_) => "identifier",
            PathNode::Block(_) => "block",
            PathNode::Assign(_) => "assignment",
            PathNode::Return(_) => "return",
            PathNode::Statement(_) => "statement",
            PathNode::Call { .. } => "call",
            PathNode::FunctionLiteral { .. } => "function literal",
            PathNode::Expression(_) => "expression",
        }
    }
}

/// Syntax path from the innermost node containing `pos` out to the file.
///
/// Where sibling spans share a boundary offset, the leftmost one wins.
/// Empty when `pos` lies outside the file.
pub fn enclosing_path(file: &File, pos: usize) -> Vec<PathNode<'_>> {
    let mut collector = PathCollector {
        pos,
        nodes: Vec::new(),
    };
    if file.span.contains(pos) {
        collector.nodes.push(PathNode::File(file));
        if let Some(declaration) = file
            .declarations
            .iter()
            .find(|declaration| declaration.span().contains(pos))
        {
            collector.visit_declaration(declaration);
        }
    }
    collector.nodes.reverse();
    collector.nodes
}

struct PathCollector<'a> {
    pos: usize,
    nodes: Vec<PathNode<'a>>,
}

impl<'a> PathCollector<'a> {
    fn visit_declaration(&mut self, declaration: &'a Declaration) {
        match declaration {
            Declaration::Var(declaration) => self.visit_var_declaration(declaration),
            Declaration::Function(function) => {
                self.nodes.push(PathNode::FunctionDecl(function));
                if function.name.span.contains(self.pos) {
                    self.nodes.push(PathNode::Identifier(&function.name));
                } else if function.signature.span.contains(self.pos) {
                    self.visit_signature(&function.signature);
                } else if let Some(body) = &function.body {
                    self.visit_block(body);
                }
            }
        }
    }

    fn visit_var_declaration(&mut self, declaration: &'a VarDeclaration) {
        if !declaration.span.contains(self.pos) {
            return;
        }
        self.nodes.push(PathNode::VarDeclaration(declaration));
        let Some(spec) = declaration
            .specs
            .iter()
            .find(|spec| spec.span.contains(self.pos))
        else {
            return;
        };
        self.nodes.push(PathNode::ValueSpec(spec));
        if let Some(name) = spec.names.iter().find(|name| name.span.contains(self.pos)) {
            self.nodes.push(PathNode::Identifier(name));
            return;
        }
        if let Some(type_expr) = spec
            .type_expr
            .as_ref()
            .filter(|type_expr| type_expr.span.contains(self.pos))
        {
            self.visit_expression(type_expr);
            return;
        }
        self.visit_first(&spec.values);
    }

    fn visit_signature(&mut self, signature: &'a FunctionSignature) {
        if !signature.span.contains(self.pos) {
            return;
        }
        self.nodes.push(PathNode::Signature(signature));
        let Some(field) = signature
            .parameters
            .iter()
            .chain(signature.results.iter())
            .find(|field| field.span.contains(self.pos))
        else {
            return;
        };
        self.nodes.push(PathNode::Field(field));
        if let Some(name) = field.names.iter().find(|name| name.span.contains(self.pos)) {
            self.nodes.push(PathNode::Identifier(name));
        } else {
            self.visit_expression(&field.type_expr);
        }
    }

    fn visit_block(&mut self, block: &'a Block) {
        if !block.span.contains(self.pos) {
            return;
        }
        self.nodes.push(PathNode::Block(block));
        if let Some(statement) = block
            .statements
            .iter()
            .find(|statement| statement.span().contains(self.pos))
        {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &'a Statement) {
        match statement {
            Statement::Var(declaration) => self.visit_var_declaration(declaration),
            Statement::Block(block) => self.visit_block(block),
            Statement::Assign(assign) => {
                self.nodes.push(PathNode::Assign(assign));
                if !self.visit_first(&assign.lhs) {
                    self.visit_first(&assign.rhs);
                }
            }
            Statement::Return(ret) => {
                self.nodes.push(PathNode::Return(ret));
                self.visit_first(&ret.results);
            }
            Statement::Expression(expression_statement) => {
                self.nodes.push(PathNode::Statement(statement));
                self.visit_expression(&expression_statement.expression);
            }
            Statement::If(conditional) => {
                self.nodes.push(PathNode::Statement(statement));
                if let Some(init) = conditional
                    .init
                    .as_deref()
                    .filter(|init| init.span().contains(self.pos))
                {
                    self.visit_statement(init);
                } else if conditional.condition.span.contains(self.pos) {
                    self.visit_expression(&conditional.condition);
                } else if conditional.consequent.span.contains(self.pos) {
                    self.visit_block(&conditional.consequent);
                } else if let Some(alternative) = conditional
                    .alternative
                    .as_deref()
                    .filter(|alternative| alternative.span().contains(self.pos))
                {
                    self.visit_statement(alternative);
                }
            }
        }
    }

    /// Descends into the first expression containing the position.
    fn visit_first(&mut self, expressions: &'a [Expression]) -> bool {
        match expressions
            .iter()
            .find(|expression| expression.span.contains(self.pos))
        {
            Some(expression) => {
                self.visit_expression(expression);
                true
            }
            None => false,
        }
    }

    fn visit_expression(&mut self, expression: &'a Expression) {
        if !expression.span.contains(self.pos) {
            return;
        }
        match &expression.kind {
            ExpressionKind::Call(call) => {
                self.nodes.push(PathNode::Call { expression, call });
                if call.callee.span.contains(self.pos) {
                    self.visit_expression(&call.callee);
                } else {
                    self.visit_first(&call.arguments);
                }
            }
            ExpressionKind::FunctionLiteral(literal) => {
                self.nodes
                    .push(PathNode::FunctionLiteral { expression, literal });
                if literal.signature.span.contains(self.pos) {
                    self.visit_signature(&literal.signature);
                } else {
                    self.visit_block(&literal.body);
                }
            }
            ExpressionKind::Selector(selector) => {
                self.nodes.push(PathNode::Expression(expression));
                if selector.property.span.contains(self.pos) {
                    self.nodes.push(PathNode::Identifier(&selector.property));
                } else {
                    self.visit_expression(&selector.object);
                }
            }
            ExpressionKind::Unary(unary) => {
                self.nodes.push(PathNode::Expression(expression));
                self.visit_expression(&unary.operand);
            }
            ExpressionKind::Star(inner) | ExpressionKind::Paren(inner) => {
                self.nodes.push(PathNode::Expression(expression));
                self.visit_expression(inner);
            }
            ExpressionKind::CompositeLiteral(literal) => {
                self.nodes.push(PathNode::Expression(expression));
                match literal
                    .type_expr
                    .as_deref()
                    .filter(|type_expr| type_expr.span.contains(self.pos))
                {
                    Some(type_expr) => self.visit_expression(type_expr),
                    None => {
                        self.visit_first(&literal.elements);
                    }
                }
            }
            ExpressionKind::Identifier(_) | ExpressionKind::Literal(_) => {
                self.nodes.push(PathNode::Expression(expression));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: u32, start: usize, name: &str) -> Expression {
        Expression {
            id: ExprId(id),
            span: Span::new(start, start + name.len()),
            kind: ExpressionKind::Identifier(name.to_string()),
        }
    }

    // func f() T { return g(x) }
    fn sample() -> File {
        let call = Expression {
            id: ExprId(5),
            span: Span::new(20, 24),
            kind: ExpressionKind::Call(CallExpression {
                callee: Box::new(ident(3, 20, "g")),
                arguments: vec![ident(4, 22, "x")],
                has_ellipsis: false,
            }),
        };
        let ret = Statement::Return(ReturnStatement {
            span: Span::new(13, 24),
            results: vec![call],
        });
        let function = FunctionDeclaration {
            span: Span::new(0, 26),
            name: Identifier {
                id: ExprId(1),
                name: "f".to_string(),
                span: Span::new(5, 6),
            },
            signature: FunctionSignature {
                span: Span::new(6, 10),
                parameters: Vec::new(),
                results: vec![Field {
                    span: Span::new(9, 10),
                    names: Vec::new(),
                    type_expr: ident(2, 9, "T"),
                }],
            },
            body: Some(Block {
                span: Span::new(11, 26),
                statements: vec![ret],
            }),
        };
        File {
            source: SourceId(0),
            scope: "main".to_string(),
            span: Span::new(0, 27),
            declarations: vec![Declaration::Function(function)],
        }
    }

    fn labels(path: &[PathNode<'_>]) -> Vec<&'static str> {
        path.iter().map(PathNode::label).collect()
    }

    #[test]
    fn span_containment_includes_both_ends() {
        let span = Span::new(3, 7);
        assert!(span.contains(3));
        assert!(span.contains(7));
        assert!(!span.contains(2));
        assert!(!span.contains(8));
    }

    #[test]
    fn path_runs_from_argument_out_to_file() {
        let file = sample();
        let path = enclosing_path(&file, 22);

        assert_eq!(
            labels(&path),
            [
                "expression",
                "call",
                "return",
                "block",
                "function declaration",
                "file"
            ]
        );
        assert_eq!(path[0].span(), Span::new(22, 23));
    }

    #[test]
    fn shared_boundary_descends_into_leftmost_child() {
        let file = sample();
        let path = enclosing_path(&file, 21);

        match path.first() {
            Some(PathNode::Expression(expression)) => assert_eq!(expression.id, ExprId(3)),
            other => panic!("expected callee expression, found {other:?}"),
        }
    }

    #[test]
    fn path_through_result_type_includes_signature() {
        let file = sample();
        let path = enclosing_path(&file, 9);

        assert_eq!(
            labels(&path),
            [
                "expression",
                "field",
                "signature",
                "function declaration",
                "file"
            ]
        );
    }

    #[test]
    fn position_outside_file_has_empty_path() {
        let file = sample();
        assert!(enclosing_path(&file, 100).is_empty());
    }

    #[test]
    fn grouped_results_expand_to_one_slot_per_name() {
        let name = |id: u32| Identifier {
            id: ExprId(id),
            name: format!("r{id}"),
            span: Span::default(),
        };
        let signature = FunctionSignature {
            span: Span::default(),
            parameters: Vec::new(),
            results: vec![
                Field {
                    span: Span::default(),
                    names: vec![name(1), name(2)],
                    type_expr: ident(3, 0, "T"),
                },
                Field {
                    span: Span::default(),
                    names: Vec::new(),
                    type_expr: ident(4, 0, "U"),
                },
            ],
        };

        let ids: Vec<ExprId> = signature.result_types().iter().map(|ty| ty.id).collect();
        assert_eq!(ids, [ExprId(3), ExprId(3), ExprId(4)]);
    }
}
