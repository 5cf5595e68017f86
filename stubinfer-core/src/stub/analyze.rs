use std::sync::Arc;

use tracing::debug;

use crate::ast::{
    AssignStatement, CallExpression, Expression, ExpressionKind, PathNode, ReturnStatement,
    ValueSpec,
};
use crate::error::Inconsistency;
use crate::source::SourceMap;
use crate::types::{ExprMode, Type, TypeInfo};

use super::resolve::{concrete_type, enclosing_function, interface_from_type, interface_type};
use super::{StubInfo, TypeName};

pub(super) struct Analyzer<'a> {
    pub source_map: &'a Arc<SourceMap>,
    pub info: &'a TypeInfo,
    pub pos: usize,
}

fn find_containing(expressions: &[Expression], pos: usize) -> Option<(usize, &Expression)> {
    expressions
        .iter()
        .enumerate()
        .find(|(_, expression)| expression.span.contains(pos))
}

impl Analyzer<'_> {
    fn stub(&self, interface: TypeName, (concrete, pointer): (TypeName, bool)) -> StubInfo {
        StubInfo {
            interface,
            concrete,
            pointer,
            source_map: Arc::clone(self.source_map),
        }
    }

    /// `var x I = v`, or `var x = I(v)` when the call's callee names a type.
    pub fn from_value_spec(&self, spec: &ValueSpec) -> Option<StubInfo> {
        // Positions on the declared names have no initializer to inspect.
        let (_, mut value) = find_containing(&spec.values, self.pos)?;

        let mut interface_syntax = spec.type_expr.as_ref();
        if interface_syntax.is_none() {
            if let ExpressionKind::Call(call) = &value.kind {
                let callee_is_type = self
                    .info
                    .type_and_mode(call.callee.id)
                    .is_some_and(|entry| entry.mode == ExprMode::Type);
                if callee_is_type && call.arguments.len() == 1 {
                    interface_syntax = Some(&*call.callee);
                    value = &call.arguments[0];
                }
            }
        }

        let concrete = concrete_type(self.info, value)?;
        let interface = interface_type(self.info, interface_syntax?)?;
        Some(self.stub(interface, concrete))
    }

    /// `x = v` where `x` has interface type.
    pub fn from_assign(&self, assign: &AssignStatement) -> Option<StubInfo> {
        let (index, value) = find_containing(&assign.rhs, self.pos)?;
        // More values than targets is rejected by the checker before any
        // interface conversion error is reported.
        let target = assign.lhs.get(index)?;

        let interface = interface_type(self.info, target)?;
        let concrete = concrete_type(self.info, value)?;
        Some(self.stub(interface, concrete))
    }

    /// `return v` inside a function whose matching result is an interface.
    pub fn from_return(
        &self,
        ret: &ReturnStatement,
        path: &[PathNode<'_>],
    ) -> Result<Option<StubInfo>, Inconsistency> {
        let Some((index, operand)) = find_containing(&ret.results, self.pos) else {
            return Err(Inconsistency::PositionOutsideReturn {
                pos: self.pos,
                start: ret.span.start,
                end: ret.span.end,
            });
        };

        let Some(concrete) = concrete_type(self.info, operand) else {
            return Ok(None);
        };
        let signature =
            enclosing_function(path, self.info).ok_or(Inconsistency::MissingEnclosingFunction)?;
        let results = signature.result_types();
        if results.len() != ret.results.len() {
            return Err(Inconsistency::ReturnArity {
                operands: ret.results.len(),
                results: results.len(),
            });
        }

        Ok(interface_type(self.info, results[index]).map(|interface| self.stub(interface, concrete)))
    }

    /// `f(v)` where the parameter aligned with `v` is an interface.
    pub fn from_call(&self, call: &CallExpression) -> Option<StubInfo> {
        let (index, argument) = find_containing(&call.arguments, self.pos)?;
        let concrete = concrete_type(self.info, argument)?;

        let callee = self.info.unalias(self.info.type_of(call.callee.id)?);
        let Type::Signature(signature) = self.info.get(callee)? else {
            return None;
        };

        let variadic_index = signature.params.len().saturating_sub(1);
        let param = if signature.variadic && index >= variadic_index {
            let last = *signature.params.last()?;
            if call.has_ellipsis {
                // `f(xs...)` passes the slice itself.
                last
            } else {
                match self.info.get(self.info.unalias(last))? {
                    Type::Slice(element) => *element,
                    _ => return None,
                }
            }
        } else {
            // Out of range only on calls the checker already rejected.
            *signature.params.get(index)?
        };

        debug!(
            pos = self.pos,
            argument = index,
            param = %self.info.describe(param),
            "resolved call parameter"
        );
        let interface = interface_from_type(self.info, param)?;
        Some(self.stub(interface, concrete))
    }
}
