//! Recovers the interface and concrete type behind a "missing method"
//! conversion from the syntax surrounding the offending position.
//!
//! Four shapes are recognised: typed `var` declarations (including the
//! `var _ = I(v)` conversion form), assignments, return statements and call
//! arguments. The result feeds a fix that declares the missing methods on
//! the concrete type.

mod analyze;
mod resolve;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ast::PathNode;
use crate::error::Inconsistency;
use crate::source::SourceMap;
use crate::types::{qualified_name, TypeId, TypeInfo};

use analyze::Analyzer;

/// Identity of a named type: where it is declared and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub id: TypeId,
    /// `None` only for the universe `error` interface.
    pub scope: Option<String>,
    pub name: String,
}

impl TypeName {
    pub fn qualified(&self) -> String {
        qualified_name(self.scope.as_deref(), &self.name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// A concrete type that should implement an interface it currently misses.
#[derive(Debug, Clone)]
pub struct StubInfo {
    pub interface: TypeName,
    pub concrete: TypeName,
    /// The concrete value is used through a pointer.
    pub pointer: bool,
    pub source_map: Arc<SourceMap>,
}

impl PartialEq for StubInfo {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface
            && self.concrete == other.concrete
            && self.pointer == other.pointer
            && Arc::ptr_eq(&self.source_map, &other.source_map)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    Found(StubInfo),
    /// Nothing to recover at this position; expected for most positions.
    NotApplicable,
    Inconsistent(Inconsistency),
}

impl Inference {
    pub fn found(self) -> Option<StubInfo> {
        match self {
            Inference::Found(info) => Some(info),
            Inference::NotApplicable | Inference::Inconsistent(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Inference::Found(_))
    }
}

impl From<Option<StubInfo>> for Inference {
    fn from(found: Option<StubInfo>) -> Self {
        found.map_or(Inference::NotApplicable, Inference::Found)
    }
}

impl From<Result<Option<StubInfo>, Inconsistency>> for Inference {
    fn from(result: Result<Option<StubInfo>, Inconsistency>) -> Self {
        match result {
            Ok(found) => found.into(),
            Err(inconsistency) => Inference::Inconsistent(inconsistency),
        }
    }
}

/// Walks `path` from the innermost node outwards and analyzes the first
/// recognised shape.
///
/// Declarations, returns and assignments decide the outcome as soon as they
/// are reached. A call that yields nothing lets the walk continue, since the
/// call may be a conversion unrelated to any interface parameter.
///
/// Inconsistent outcomes are logged at `warn` here, so callers that need the
/// three-way result (the command-line front end) and [`infer`] report them
/// the same way.
pub fn analyze(
    source_map: &Arc<SourceMap>,
    info: &TypeInfo,
    path: &[PathNode<'_>],
    pos: usize,
) -> Inference {
    let analyzer = Analyzer {
        source_map,
        info,
        pos,
    };
    let inference = dispatch(&analyzer, path);
    if let Inference::Inconsistent(inconsistency) = &inference {
        warn!(pos, error = %inconsistency, "stub inference skipped");
    }
    inference
}

fn dispatch(analyzer: &Analyzer<'_>, path: &[PathNode<'_>]) -> Inference {
    let pos = analyzer.pos;
    for node in path {
        match node {
            PathNode::ValueSpec(spec) => {
                debug!(pos, "analyzing value spec");
                return analyzer.from_value_spec(spec).into();
            }
            PathNode::Return(ret) => {
                debug!(pos, "analyzing return statement");
                return analyzer.from_return(ret, path).into();
            }
            PathNode::Assign(assign) => {
                debug!(pos, "analyzing assignment");
                return analyzer.from_assign(assign).into();
            }
            PathNode::Call { call, .. } => {
                debug!(pos, "analyzing call");
                if let Some(found) = analyzer.from_call(call) {
                    return Inference::Found(found);
                }
            }
            _ => {}
        }
    }
    Inference::NotApplicable
}

/// Interface/concrete pair for the conversion at `pos`, if one can be
/// recovered. Inconsistencies are logged by [`analyze`] and treated as no
/// result.
pub fn infer(
    source_map: &Arc<SourceMap>,
    info: &TypeInfo,
    path: &[PathNode<'_>],
    pos: usize,
) -> Option<StubInfo> {
    let found = analyze(source_map, info, path, pos).found()?;
    debug!(
        pos,
        interface = %found.interface,
        concrete = %found.concrete,
        pointer = found.pointer,
        "inferred missing-method stub"
    );
    Some(found)
}
