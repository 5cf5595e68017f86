use thiserror::Error;

/// Internal inconsistencies between a syntax path and the position it was
/// computed for. Never expected on well-typed input; reported, not surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("pos {pos} not within return statement bounds: [{start}-{end}]")]
    PositionOutsideReturn { pos: usize, start: usize, end: usize },
    #[error("could not find the enclosing function of the return statement")]
    MissingEnclosingFunction,
    #[error("{operands}-operand return statement in {results}-result function")]
    ReturnArity { operands: usize, results: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeInfoError {
    #[error("type #{index} references unknown type #{target}")]
    DanglingType { index: u32, target: u32 },
    #[error("expression #{expr} is recorded with unknown type #{target}")]
    DanglingExpression { expr: u32, target: u32 },
    #[error("definition #{ident} is recorded with unknown type #{target}")]
    DanglingDefinition { ident: u32, target: u32 },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid type information: {0}")]
    Types(#[from] TypeInfoError),
    #[error("file refers to source #{source_id} but the snapshot has {available} source(s)")]
    UnknownSource { source_id: u32, available: usize },
}
