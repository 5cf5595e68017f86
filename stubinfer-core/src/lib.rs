mod ast;
mod error;
mod snapshot;
mod source;
mod stub;
mod types;

pub use crate::ast::{
    enclosing_path, AssignStatement, Block, CallExpression, CompositeLiteral, Declaration,
    ExprId, Expression, ExpressionKind, ExpressionStatement, Field, File, FunctionDeclaration,
    FunctionLiteral, FunctionSignature, Identifier, IfStatement, Literal, PathNode,
    ReturnStatement, SelectorExpression, Span, Statement, UnaryExpression, UnaryOperator,
    ValueSpec, VarDeclaration,
};
pub use crate::error::{Inconsistency, SnapshotError, TypeInfoError};
pub use crate::snapshot::{Snapshot, SnapshotSource};
pub use crate::source::{SourceFile, SourceId, SourceMap};
pub use crate::stub::{analyze, infer, Inference, StubInfo, TypeName};
pub use crate::types::{
    AliasType, BasicKind, ExprMode, InterfaceType, Method, NamedType, Signature, StructField,
    Type, TypeAndMode, TypeId, TypeInfo,
};
