use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::ExprId;
use crate::error::TypeInfoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Bool,
    Int,
    Int32,
    Int64,
    Uint,
    Uint8,
    Float32,
    Float64,
    String,
    UntypedNil,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    /// Declaring scope; absent only for universe types.
    pub scope: Option<String>,
    pub underlying: Option<TypeId>,
    #[serde(default)]
    pub type_arguments: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasType {
    pub name: String,
    pub scope: Option<String>,
    pub target: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<TypeId>,
    pub results: Vec<TypeId>,
    /// The last parameter is a slice collecting trailing arguments.
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: TypeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
    #[serde(default)]
    pub embedded: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeId,
    #[serde(default)]
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Basic(BasicKind),
    Named(NamedType),
    Alias(AliasType),
    Pointer(TypeId),
    Slice(TypeId),
    Array { len: u64, element: TypeId },
    Map { key: TypeId, value: TypeId },
    Signature(Signature),
    Interface(InterfaceType),
    Struct(Vec<StructField>),
    TypeParameter { name: String, constraint: Option<TypeId> },
}

impl Type {
    fn references(&self) -> Vec<TypeId> {
        match self {
            Type::Basic(_) => Vec::new(),
            Type::Named(named) => named
                .underlying
                .iter()
                .chain(named.type_arguments.iter())
                .copied()
                .collect(),
            Type::Alias(alias) => vec![alias.target],
            Type::Pointer(element) | Type::Slice(element) | Type::Array { element, .. } => {
                vec![*element]
            }
            Type::Map { key, value } => vec![*key, *value],
            Type::Signature(signature) => signature
                .params
                .iter()
                .chain(signature.results.iter())
                .copied()
                .collect(),
            Type::Interface(interface) => interface
                .methods
                .iter()
                .map(|method| method.signature)
                .chain(interface.embedded.iter().copied())
                .collect(),
            Type::Struct(fields) => fields.iter().map(|field| field.ty).collect(),
            Type::TypeParameter { constraint, .. } => constraint.iter().copied().collect(),
        }
    }
}

/// Whether an expression denotes a value or names a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprMode {
    Value,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAndMode {
    pub ty: TypeId,
    pub mode: ExprMode,
}

/// Read-only results of type checking a program: every type the checker
/// produced, the type of each expression, and the recorded definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawTypeInfo", into = "RawTypeInfo")]
pub struct TypeInfo {
    types: Vec<Type>,
    expressions: HashMap<ExprId, TypeAndMode>,
    definitions: HashMap<ExprId, TypeId>,
    universe_error: TypeId,
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInfo {
    pub fn new() -> Self {
        let mut info = Self {
            types: Vec::new(),
            expressions: HashMap::new(),
            definitions: HashMap::new(),
            universe_error: TypeId(0),
        };
        info.universe_error = info.declare_universe_error();
        info
    }

    fn declare_universe_error(&mut self) -> TypeId {
        let string = self.basic(BasicKind::String);
        let error_method = self.signature(Vec::new(), vec![string], false);
        let interface = self.interface(vec![("Error", error_method)]);
        self.insert(Type::Named(NamedType {
            name: "error".to_string(),
            scope: None,
            underlying: Some(interface),
            type_arguments: Vec::new(),
        }))
    }

    /// Scope-less interface named `error`, as recorded by a checker.
    fn is_universe_error_candidate(&self, id: TypeId) -> bool {
        let scopeless_error = matches!(
            self.get(id),
            Some(Type::Named(named)) if named.scope.is_none() && named.name == "error"
        );
        scopeless_error && self.is_interface(id)
    }

    /// The predeclared `error` interface, the one named interface with no
    /// declaring scope.
    pub fn universe_error(&self) -> TypeId {
        self.universe_error
    }

    pub fn insert(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize)
    }

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        self.insert(Type::Basic(kind))
    }

    /// Declares a named type whose underlying type is filled in later with
    /// [`TypeInfo::set_underlying`], for self-referential declarations.
    pub fn declare_named(&mut self, scope: Option<&str>, name: &str) -> TypeId {
        self.insert(Type::Named(NamedType {
            name: name.to_string(),
            scope: scope.map(str::to_string),
            underlying: None,
            type_arguments: Vec::new(),
        }))
    }

    pub fn set_underlying(&mut self, named: TypeId, underlying: TypeId) -> bool {
        match self.types.get_mut(named.0 as usize) {
            Some(Type::Named(named)) => {
                named.underlying = Some(underlying);
                true
            }
            _ => false,
        }
    }

    pub fn named(&mut self, scope: Option<&str>, name: &str, underlying: TypeId) -> TypeId {
        let id = self.declare_named(scope, name);
        self.set_underlying(id, underlying);
        id
    }

    pub fn alias(&mut self, scope: Option<&str>, name: &str, target: TypeId) -> TypeId {
        self.insert(Type::Alias(AliasType {
            name: name.to_string(),
            scope: scope.map(str::to_string),
            target,
        }))
    }

    pub fn pointer(&mut self, element: TypeId) -> TypeId {
        self.insert(Type::Pointer(element))
    }

    pub fn slice(&mut self, element: TypeId) -> TypeId {
        self.insert(Type::Slice(element))
    }

    pub fn signature(&mut self, params: Vec<TypeId>, results: Vec<TypeId>, variadic: bool) -> TypeId {
        self.insert(Type::Signature(Signature {
            params,
            results,
            variadic,
        }))
    }

    pub fn interface(&mut self, methods: Vec<(&str, TypeId)>) -> TypeId {
        self.insert(Type::Interface(InterfaceType {
            methods: methods
                .into_iter()
                .map(|(name, signature)| Method {
                    name: name.to_string(),
                    signature,
                })
                .collect(),
            embedded: Vec::new(),
        }))
    }

    pub fn record(&mut self, expr: ExprId, ty: TypeId) {
        self.expressions.insert(
            expr,
            TypeAndMode {
                ty,
                mode: ExprMode::Value,
            },
        );
    }

    pub fn record_type_expr(&mut self, expr: ExprId, ty: TypeId) {
        self.expressions.insert(
            expr,
            TypeAndMode {
                ty,
                mode: ExprMode::Type,
            },
        );
    }

    pub fn define(&mut self, ident: ExprId, ty: TypeId) {
        self.definitions.insert(ident, ty);
    }

    pub fn type_of(&self, expr: ExprId) -> Option<TypeId> {
        self.expressions.get(&expr).map(|entry| entry.ty)
    }

    pub fn type_and_mode(&self, expr: ExprId) -> Option<TypeAndMode> {
        self.expressions.get(&expr).copied()
    }

    pub fn is_defined(&self, ident: ExprId) -> bool {
        self.definitions.contains_key(&ident)
    }

    /// Follows alias targets until reaching a type that is not an alias.
    pub fn unalias(&self, mut id: TypeId) -> TypeId {
        for _ in 0..=self.types.len() {
            match self.get(id) {
                Some(Type::Alias(alias)) => id = alias.target,
                _ => return id,
            }
        }
        id
    }

    /// Structural form of a type, looking through aliases and names.
    pub fn underlying(&self, id: TypeId) -> Option<&Type> {
        let mut current = self.unalias(id);
        for _ in 0..=self.types.len() {
            match self.get(current)? {
                Type::Named(named) => current = self.unalias(named.underlying?),
                Type::Alias(_) => return None,
                other => return Some(other),
            }
        }
        None
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        matches!(self.underlying(id), Some(Type::Interface(_)))
    }

    /// Display form used in logs and CLI output.
    pub fn describe(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(Type::Basic(kind)) => format!("{kind:?}").to_lowercase(),
            Some(Type::Named(named)) => qualified_name(named.scope.as_deref(), &named.name),
            Some(Type::Alias(alias)) => qualified_name(alias.scope.as_deref(), &alias.name),
            Some(Type::Pointer(element)) => format!("*{}", self.describe(*element)),
            Some(Type::Slice(element)) => format!("[]{}", self.describe(*element)),
            Some(Type::Array { len, element }) => format!("[{len}]{}", self.describe(*element)),
            Some(Type::Map { key, value }) => {
                format!("map[{}]{}", self.describe(*key), self.describe(*value))
            }
            Some(Type::Signature(signature)) => {
                let params = signature
                    .params
                    .iter()
                    .map(|param| self.describe(*param))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("func({params})")
            }
            Some(Type::Interface(_)) => "interface{...}".to_string(),
            Some(Type::Struct(_)) => "struct{...}".to_string(),
            Some(Type::TypeParameter { name, .. }) => name.clone(),
            None => format!("<unknown type #{}>", id.0),
        }
    }

    /// Checks that every type reference in the context points into the arena.
    pub fn validate(&self) -> Result<(), TypeInfoError> {
        let in_range = |id: TypeId| (id.0 as usize) < self.types.len();
        for (index, ty) in self.types.iter().enumerate() {
            if let Some(target) = ty.references().into_iter().find(|id| !in_range(*id)) {
                return Err(TypeInfoError::DanglingType {
                    index: index as u32,
                    target: target.0,
                });
            }
        }
        for (expr, entry) in &self.expressions {
            if !in_range(entry.ty) {
                return Err(TypeInfoError::DanglingExpression {
                    expr: expr.0,
                    target: entry.ty.0,
                });
            }
        }
        for (ident, ty) in &self.definitions {
            if !in_range(*ty) {
                return Err(TypeInfoError::DanglingDefinition {
                    ident: ident.0,
                    target: ty.0,
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn qualified_name(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) => format!("{scope}.{name}"),
        None => name.to_string(),
    }
}

#[derive(Serialize, Deserialize)]
struct RawTypeInfo {
    types: Vec<Type>,
    #[serde(default)]
    expressions: Vec<RecordedExpression>,
    #[serde(default)]
    definitions: Vec<RecordedDefinition>,
}

#[derive(Serialize, Deserialize)]
struct RecordedExpression {
    expr: ExprId,
    ty: TypeId,
    #[serde(default = "value_mode")]
    mode: ExprMode,
}

fn value_mode() -> ExprMode {
    ExprMode::Value
}

#[derive(Serialize, Deserialize)]
struct RecordedDefinition {
    ident: ExprId,
    ty: TypeId,
}

impl From<RawTypeInfo> for TypeInfo {
    fn from(raw: RawTypeInfo) -> Self {
        let mut info = Self {
            types: raw.types,
            expressions: raw
                .expressions
                .into_iter()
                .map(|entry| {
                    (
                        entry.expr,
                        TypeAndMode {
                            ty: entry.ty,
                            mode: entry.mode,
                        },
                    )
                })
                .collect(),
            definitions: raw
                .definitions
                .into_iter()
                .map(|entry| (entry.ident, entry.ty))
                .collect(),
            universe_error: TypeId(0),
        };
        let existing = (0..info.types.len())
            .map(|index| TypeId(index as u32))
            .find(|&id| info.is_universe_error_candidate(id));
        info.universe_error = match existing {
            Some(id) => id,
            None => info.declare_universe_error(),
        };
        info
    }
}

impl From<TypeInfo> for RawTypeInfo {
    fn from(info: TypeInfo) -> Self {
        let mut expressions: Vec<_> = info
            .expressions
            .into_iter()
            .map(|(expr, entry)| RecordedExpression {
                expr,
                ty: entry.ty,
                mode: entry.mode,
            })
            .collect();
        expressions.sort_by_key(|entry| entry.expr);
        let mut definitions: Vec<_> = info
            .definitions
            .into_iter()
            .map(|(ident, ty)| RecordedDefinition { ident, ty })
            .collect();
        definitions.sort_by_key(|entry| entry.ident);
        Self {
            types: info.types,
            expressions,
            definitions,
        }
    }
}
