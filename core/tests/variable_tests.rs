// tests/variable_tests.rs
mod common;

use common::*;
use wireflow::{
  assert_types_match, common_type, ClassType, Diagnostic, IntoOption, OptionExt, Outcome, Value, VarRef, VarType,
  Variable, VariableSet,
};

// --- Type lattice ---

#[test]
fn test_numbers_share_number_but_bool_is_not_an_int() {
  setup_tracing();
  assert!(VarType::Int.is_subtype_of(&VarType::Number));
  assert!(VarType::Float.is_subtype_of(&VarType::Number));
  assert!(!VarType::Bool.is_subtype_of(&VarType::Int));
  assert!(VarType::Str.is_subtype_of(&VarType::Any));
  assert_eq!(common_type(&VarType::Int, &VarType::Float), Outcome::okay(VarType::Number));
  assert_eq!(common_type(&VarType::Int, &VarType::Number), Outcome::okay(VarType::Number));
}

#[test]
fn test_common_type_never_settles_on_any() {
  let outcome = common_type(&VarType::Str, &VarType::Int);
  assert!(outcome.is_fail());
  assert_eq!(kinds(outcome.errors()), vec!["NoCommonType"]);
}

#[test]
fn test_common_type_prefers_specific_class_over_marker() {
  let shape_marker = VarType::class(ClassType::marker("Drawable"));
  let shape = VarType::class(ClassType::new("Shape").extending(shape_marker.clone()));
  let square = VarType::class(ClassType::new("Square").extending(shape.clone()));
  let circle = VarType::class(ClassType::new("Circle").extending(shape.clone()));
  assert_eq!(common_type(&square, &circle), Outcome::okay(shape));

  let text = VarType::class(ClassType::new("Text").extending(shape_marker.clone()));
  let broad = common_type(&square, &text);
  assert!(broad.is_warn());
  assert_eq!(broad.value(), Some(&shape_marker));
  assert_eq!(kinds(broad.warnings()), vec!["BroadCommonType"]);
}

#[test]
fn test_value_accessors_report_type_errors() {
  assert_eq!(Value::from(3).as_int(), Ok(3));
  assert_eq!(Value::from(3).as_float(), Ok(3.0));
  assert!(matches!(Value::from("x").as_int(), Err(Diagnostic::TypeCheck { .. })));
  assert!(Value::from(2.5).type_check(&VarType::Number));
  assert!(!Value::from(true).type_check(&VarType::Int));
}

// --- Option helpers ---

#[test]
fn test_option_helpers() {
  let some = Some(3);
  assert!(some.has_value());
  assert_eq!(some.value(), Ok(&3));

  let none: Option<i32> = None;
  assert!(!none.has_value());
  assert_eq!(none.value(), Err(Diagnostic::EmptyValue));

  assert_eq!(Value::Unit.into_option(), None);
  assert_eq!(Value::from(1).into_option(), Some(Value::Int(1)));
  assert_eq!(Some(Value::Unit).into_option(), Some(Value::Unit));
}

// --- Variables ---

#[test]
fn test_type_is_inferred_from_value_then_default() {
  let bound = Variable::bound("x", 3);
  assert_eq!(bound.var_type(), Some(&VarType::Int));
  assert!(bound.var_type_inferred());

  let defaulted = Variable::unbound("x").with_default(2.5);
  assert_eq!(defaulted.var_type(), Some(&VarType::Float));
  assert!(!defaulted.is_bound());
  assert_eq!(defaulted.val(), Some(&Value::Float(2.5)));

  let mixed = Variable::unbound("x").with_default(1).bind(2.5);
  assert_eq!(mixed.var_type(), Some(&VarType::Number));
  assert!(mixed.var_type_inferred());
}

#[test]
fn test_failed_inference_leaves_no_type() {
  let var = Variable::unbound("x").with_default("text").bind(1);
  assert_eq!(var.var_type(), None);
  assert!(!var.var_type_inferred());
  let inference = var.type_inference();
  assert!(inference.is_warn());
  assert_eq!(kinds(inference.warnings()), vec!["NoCommonType"]);
}

#[test]
fn test_objects_infer_their_closest_shared_class() {
  let shape = VarType::class(ClassType::new("Shape"));
  let square = ClassType::new("Square").extending(shape.clone());
  let circle = ClassType::new("Circle").extending(shape.clone());
  let var = Variable::bound("s", Value::object(square, [("side", 2)]))
    .with_default(Value::object(circle, [("radius", 1)]));
  assert_eq!(var.var_type(), Some(&shape));
  assert!(var.var_type_inferred());

  // Unrelated classes only meet at `Any`, which is never inferred.
  let loner = Value::object(ClassType::new("Loner"), Vec::<(String, Value)>::new());
  let var = Variable::bound("s", loner).with_default(Value::object(ClassType::new("Other"), [("a", 1)]));
  assert_eq!(var.var_type(), None);
}

#[test]
fn test_explicit_type_wins_and_survives_bind() {
  let var = Variable::unbound("x").with_type(VarType::Number).with_default(1);
  assert_eq!(var.var_type(), Some(&VarType::Number));
  assert!(!var.var_type_inferred());

  let rebound = var.bind(2.5);
  assert_eq!(rebound.var_type(), Some(&VarType::Number));
  assert!(!rebound.var_type_inferred());
  assert_eq!(rebound.val(), Some(&Value::Float(2.5)));
  // The original is untouched.
  assert!(!var.is_bound());
}

#[test]
fn test_equality_ignores_inferred_flag_but_not_value() {
  let inferred = Variable::bound("x", 1);
  let explicit = Variable::bound("x", 1).with_type(VarType::Int);
  assert_eq!(inferred, explicit);
  assert_ne!(Variable::bound("x", 1), Variable::bound("x", 2));
  assert_ne!(Variable::bound("x", 1), Variable::bound("y", 1));
}

#[test]
fn test_var_ref_conversions() {
  assert_eq!(VarRef::from("a").into_variable(), Variable::unbound("a"));
  let var = Variable::bound("b", 1);
  assert_eq!(VarRef::from(&var).into_variable(), var);
  assert_eq!(Variable::constant(5).val(), Some(&Value::Int(5)));
}

#[test]
fn test_assert_types_match() {
  let int_slot = Variable::unbound("x").with_type(VarType::Int);
  let number_slot = Variable::unbound("n").with_type(VarType::Number);
  let str_slot = Variable::unbound("s").with_type(VarType::Str);
  let untyped = Variable::unbound("u");

  assert!(assert_types_match(&number_slot, &int_slot, true).is_okay());
  assert!(assert_types_match(&int_slot, &untyped, true).is_okay());

  let explicit = assert_types_match(&int_slot, &str_slot, true);
  assert!(explicit.is_fail());
  assert_eq!(kinds(explicit.errors()), vec!["ExplicitTypeMismatch"]);

  let lenient = assert_types_match(&int_slot, &str_slot, false);
  assert!(lenient.is_warn());

  let inferred = assert_types_match(&int_slot, &Variable::bound("s", "text"), true);
  assert!(inferred.is_warn());
  assert_eq!(kinds(inferred.warnings()), vec!["InferredTypeMismatch"]);

  let bool_into_int = assert_types_match(&int_slot, &Variable::unbound("b").with_type(VarType::Bool), true);
  assert!(bool_into_int.is_fail());
}

// --- Variable sets ---

#[test]
fn test_variable_set_keeps_first_duplicate_and_warns() {
  let set = VariableSet::new([Variable::bound("x", 1), Variable::bound("y", 2), Variable::bound("x", 3)]);
  assert_eq!(set.len(), 2);
  assert_eq!(set.get_int("x"), Ok(1));
  assert_eq!(set.names().collect::<Vec<_>>(), vec!["x", "y"]);

  let status = set.status();
  assert!(status.is_warn());
  let first = status.warning_values().next().cloned();
  match first {
    Some(Diagnostic::AmbiguousVariable { name, candidates, .. }) => {
      assert_eq!(name, "x");
      assert_eq!(candidates.len(), 2);
    }
    other => panic!("expected AmbiguousVariable, got {other:?}"),
  }
}

#[test]
fn test_variable_set_get_and_check() {
  let set = VariableSet::new([
    Variable::bound("a", 1),
    Variable::unbound("b").with_default("dflt"),
    Variable::unbound("c"),
  ]);
  assert_eq!(set.get("a"), Ok(&Value::Int(1)));
  assert_eq!(set.get_str("b"), Ok("dflt"));
  assert!(matches!(set.get("c"), Err(Diagnostic::UnboundVariable { .. })));
  assert!(matches!(set.get("zzz"), Err(Diagnostic::NoSuchVariable { .. })));

  assert!(set.check(["a", "b"]).is_okay());
  let checked = set.check(["a", "c", "zzz"]);
  assert_eq!(kinds(checked.errors()), vec!["UnboundVariable", "NoSuchVariable"]);
  assert!(set.check_all().is_fail());
}

#[test]
fn test_variable_set_equality_and_collect() {
  let a: VariableSet = vec![Variable::bound("x", 1), Variable::bound("y", 2)].into_iter().collect();
  let b = VariableSet::new([Variable::bound("x", 1), Variable::bound("y", 2)]);
  assert_eq!(a, b);
  assert!(a.status().is_okay());
  assert_eq!(VariableSet::empty().len(), 0);
}

#[test]
fn test_variable_serializes_with_serde() {
  let var = Variable::unbound("x").with_type(VarType::Int).with_default(3).with_desc("a number");
  let json = serde_json::to_string(&var).expect("serialize");
  let back: Variable = serde_json::from_str(&json).expect("deserialize");
  assert_eq!(back, var);
}
