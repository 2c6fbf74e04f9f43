// wireflow/src/core/value.rs

//! Dynamic values carried by variables and the type lattice used to check them.
//!
//! `VarType` is a single-inheritance lattice rooted at `Any`:
//!
//! ```text
//! Any
//!  ├── Unit, Bool, Str, List, Map
//!  ├── Number
//!  │    ├── Int
//!  │    └── Float
//!  └── Class(..)  (user-declared chains, each with an optional parent)
//! ```
//!
//! `Bool` is deliberately not a subtype of `Int`. A class can be marked as a
//! *marker* type: such classes are considered too broad to be a useful common
//! ancestor, and `common_type` only falls back to them with a warning.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::outcome::Outcome;
use crate::error::Diagnostic;

/// A user-declared nominal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
  name: String,
  parent: Option<Box<VarType>>,
  marker: bool,
}

impl ClassType {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      parent: None,
      marker: false,
    }
  }

  /// A class too general to be reported as a common type without a warning.
  pub fn marker(name: impl Into<String>) -> Self {
    Self {
      marker: true,
      ..Self::new(name)
    }
  }

  pub fn extending(self, parent: VarType) -> Self {
    Self {
      parent: Some(Box::new(parent)),
      ..self
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parent(&self) -> Option<&VarType> {
    self.parent.as_deref()
  }

  pub fn is_marker(&self) -> bool {
    self.marker
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarType {
  Any,
  Unit,
  Bool,
  Int,
  Float,
  Number,
  Str,
  List,
  Map,
  Class(ClassType),
}

impl VarType {
  pub fn class(class: ClassType) -> Self {
    VarType::Class(class)
  }

  pub fn name(&self) -> &str {
    match self {
      VarType::Any => "Any",
      VarType::Unit => "Unit",
      VarType::Bool => "Bool",
      VarType::Int => "Int",
      VarType::Float => "Float",
      VarType::Number => "Number",
      VarType::Str => "Str",
      VarType::List => "List",
      VarType::Map => "Map",
      VarType::Class(class) => class.name(),
    }
  }

  /// Direct parent in the lattice. `Any` has none; everything else without an
  /// explicit parent sits directly under `Any`.
  pub fn parent(&self) -> Option<VarType> {
    match self {
      VarType::Any => None,
      VarType::Int | VarType::Float => Some(VarType::Number),
      VarType::Class(class) => Some(class.parent().cloned().unwrap_or(VarType::Any)),
      _ => Some(VarType::Any),
    }
  }

  pub fn is_marker(&self) -> bool {
    matches!(self, VarType::Class(class) if class.is_marker())
  }

  /// Ancestors from the direct parent upwards, excluding `Any`.
  pub fn ancestors(&self) -> Vec<VarType> {
    let mut out = Vec::new();
    let mut cur = self.parent();
    while let Some(ty) = cur {
      if ty == VarType::Any {
        break;
      }
      cur = ty.parent();
      out.push(ty);
    }
    out
  }

  /// Reflexive subtype check.
  pub fn is_subtype_of(&self, other: &VarType) -> bool {
    if *other == VarType::Any || self == other {
      return true;
    }
    self.ancestors().iter().any(|ancestor| ancestor == other)
  }
}

impl fmt::Display for VarType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Finds the most specific type both `a` and `b` belong to.
///
/// Subtype relations are checked first. Otherwise the ancestors of `a` are
/// searched for one that also contains `b`, first skipping marker types, then
/// including them (reported as `BroadCommonType`). `Any` is never accepted.
pub fn common_type(a: &VarType, b: &VarType) -> Outcome<VarType> {
  if b.is_subtype_of(a) && *a != VarType::Any {
    return Outcome::okay(a.clone());
  }
  if a.is_subtype_of(b) && *b != VarType::Any {
    return Outcome::okay(b.clone());
  }

  let ancestors = a.ancestors();
  if let Some(common) = ancestors.iter().find(|anc| !anc.is_marker() && b.is_subtype_of(anc)) {
    return Outcome::okay(common.clone());
  }
  if let Some(common) = ancestors.iter().find(|anc| b.is_subtype_of(anc)) {
    return Outcome::warn(
      [Diagnostic::BroadCommonType {
        types: vec![a.clone(), b.clone()],
        common: common.clone(),
      }],
      common.clone(),
    );
  }
  Outcome::fail([Diagnostic::NoCommonType {
    types: vec![a.clone(), b.clone()],
  }])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  Unit,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Value>),
  Map(BTreeMap<String, Value>),
  Object {
    class: ClassType,
    fields: BTreeMap<String, Value>,
  },
}

impl Value {
  pub fn object<K, V>(class: ClassType, fields: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<Value>,
  {
    Value::Object {
      class,
      fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }

  pub fn var_type(&self) -> VarType {
    match self {
      Value::Unit => VarType::Unit,
      Value::Bool(_) => VarType::Bool,
      Value::Int(_) => VarType::Int,
      Value::Float(_) => VarType::Float,
      Value::Str(_) => VarType::Str,
      Value::List(_) => VarType::List,
      Value::Map(_) => VarType::Map,
      Value::Object { class, .. } => VarType::Class(class.clone()),
    }
  }

  pub fn is_unit(&self) -> bool {
    matches!(self, Value::Unit)
  }

  pub fn type_check(&self, expected: &VarType) -> bool {
    self.var_type().is_subtype_of(expected)
  }

  fn mismatch(&self, expected: VarType) -> Diagnostic {
    Diagnostic::TypeCheck {
      value: self.clone(),
      expected,
    }
  }

  pub fn as_bool(&self) -> Result<bool, Diagnostic> {
    match self {
      Value::Bool(b) => Ok(*b),
      other => Err(other.mismatch(VarType::Bool)),
    }
  }

  pub fn as_int(&self) -> Result<i64, Diagnostic> {
    match self {
      Value::Int(i) => Ok(*i),
      other => Err(other.mismatch(VarType::Int)),
    }
  }

  /// Numeric view; integers widen to floats.
  pub fn as_float(&self) -> Result<f64, Diagnostic> {
    match self {
      Value::Float(x) => Ok(*x),
      Value::Int(i) => Ok(*i as f64),
      other => Err(other.mismatch(VarType::Number)),
    }
  }

  pub fn as_str(&self) -> Result<&str, Diagnostic> {
    match self {
      Value::Str(s) => Ok(s),
      other => Err(other.mismatch(VarType::Str)),
    }
  }

  pub fn as_list(&self) -> Result<&[Value], Diagnostic> {
    match self {
      Value::List(items) => Ok(items),
      other => Err(other.mismatch(VarType::List)),
    }
  }

  pub fn as_map(&self) -> Result<&BTreeMap<String, Value>, Diagnostic> {
    match self {
      Value::Map(map) | Value::Object { fields: map, .. } => Ok(map),
      other => Err(other.mismatch(VarType::Map)),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Unit => f.write_str("()"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Int(i) => write!(f, "{i}"),
      Value::Float(x) => write!(f, "{x}"),
      Value::Str(s) => write!(f, "{s:?}"),
      Value::List(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Value::Map(map) => write_fields(f, "", map),
      Value::Object { class, fields } => write_fields(f, class.name(), fields),
    }
  }
}

fn write_fields(f: &mut fmt::Formatter<'_>, prefix: &str, fields: &BTreeMap<String, Value>) -> fmt::Result {
  if !prefix.is_empty() {
    write!(f, "{prefix} ")?;
  }
  f.write_str("{")?;
  for (i, (key, val)) in fields.iter().enumerate() {
    if i > 0 {
      f.write_str(",")?;
    }
    write!(f, " {key}: {val}")?;
  }
  f.write_str(" }")
}

impl From<()> for Value {
  fn from(_: ()) -> Self {
    Value::Unit
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<u32> for Value {
  fn from(i: u32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<f64> for Value {
  fn from(x: f64) -> Self {
    Value::Float(x)
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Str(s)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Str(s.to_string())
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(items: Vec<T>) -> Self {
    Value::List(items.into_iter().map(Into::into).collect())
  }
}

impl From<BTreeMap<String, Value>> for Value {
  fn from(map: BTreeMap<String, Value>) -> Self {
    Value::Map(map)
  }
}
