use crate::ast::{Expression, FunctionSignature, PathNode};
use crate::types::{Type, TypeId, TypeInfo};

use super::TypeName;

/// Named type of `expr`, looking through aliases and at most one pointer.
/// The flag reports whether the pointer was present.
pub(super) fn concrete_type(info: &TypeInfo, expr: &Expression) -> Option<(TypeName, bool)> {
    let ty = info.unalias(info.type_of(expr.id)?);
    let (ty, pointer) = match info.get(ty)? {
        Type::Pointer(element) => (info.unalias(*element), true),
        _ => (ty, false),
    };
    let Type::Named(named) = info.get(ty)? else {
        return None;
    };
    // Types without a declaring scope cannot receive new methods.
    let scope = named.scope.clone()?;
    Some((
        TypeName {
            id: ty,
            scope: Some(scope),
            name: named.name.clone(),
        },
        pointer,
    ))
}

/// Named interface type denoted by (or recorded for) `expr`.
pub(super) fn interface_type(info: &TypeInfo, expr: &Expression) -> Option<TypeName> {
    interface_from_type(info, info.type_of(expr.id)?)
}

pub(super) fn interface_from_type(info: &TypeInfo, ty: TypeId) -> Option<TypeName> {
    let ty = info.unalias(ty);
    let Type::Named(named) = info.get(ty)? else {
        return None;
    };
    if !info.is_interface(ty) {
        return None;
    }
    if named.scope.is_none() && ty != info.universe_error() {
        return None;
    }
    Some(TypeName {
        id: ty,
        scope: named.scope.clone(),
        name: named.name.clone(),
    })
}

/// Signature syntax of the innermost function on `path` that the type
/// checker recorded.
pub(super) fn enclosing_function<'a>(
    path: &[PathNode<'a>],
    info: &TypeInfo,
) -> Option<&'a FunctionSignature> {
    path.iter().find_map(|node| match *node {
        PathNode::FunctionDecl(function) if info.is_defined(function.name.id) => {
            Some(&function.signature)
        }
        PathNode::FunctionLiteral {
            expression,
            literal,
        } if info.type_of(expression.id).is_some() => Some(&literal.signature),
        _ => None,
    })
}
