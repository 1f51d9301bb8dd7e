//! Declarative predicate templates over capability fields.
//!
//! A filter's condition is a small expression tree rather than a closure so
//! that the same template can be evaluated against loaded values and lowered
//! into a SQL condition by a storage binding. Templates reference parameters
//! by name; [`Predicate::bind`] replaces them with the unit of work's current
//! values.
//!
//! Evaluation follows SQL three-valued logic: comparing against a null field
//! is unknown, and a row is kept only when the predicate is definitely true.
//! Binding an equality against a null parameter produces an `IS NULL` test,
//! which is how "host-owned" rows are matched.

use crate::capability::FieldAccess;
use crate::definition::ParamDecl;
use crate::value::Value;

/// Right-hand side of a comparison in a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Literal(Value),
    Param(&'static str),
}

impl Operand {
    #[must_use]
    pub fn param(name: &'static str) -> Self {
        Operand::Param(name)
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Literal(v)
    }
}

macro_rules! literal_operand {
    ($($t:ty),*) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Literal(Value::from(v))
            }
        })*
    };
}

literal_operand!(bool, i64, i32, String, &str, uuid::Uuid);

/// Unbound condition template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    Const(bool),
    Eq(&'static str, Operand),
    Ne(&'static str, Operand),
    IsNull(&'static str),
    In(&'static str, Vec<Value>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// A referenced parameter had no binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnboundParam(pub &'static str);

impl Predicate {
    #[must_use]
    pub fn field_eq(field: &'static str, rhs: impl Into<Operand>) -> Self {
        Predicate::Eq(field, rhs.into())
    }

    #[must_use]
    pub fn field_ne(field: &'static str, rhs: impl Into<Operand>) -> Self {
        Predicate::Ne(field, rhs.into())
    }

    #[must_use]
    pub fn field_is_null(field: &'static str) -> Self {
        Predicate::IsNull(field)
    }

    #[must_use]
    pub fn field_in(field: &'static str, values: Vec<Value>) -> Self {
        Predicate::In(field, values)
    }

    #[must_use]
    pub fn all(parts: Vec<Predicate>) -> Self {
        Predicate::And(parts)
    }

    #[must_use]
    pub fn any(parts: Vec<Predicate>) -> Self {
        Predicate::Or(parts)
    }

    /// Names of parameters the template references, in first-use order.
    #[must_use]
    pub fn params(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<&'static str>) {
        match self {
            Predicate::Eq(_, Operand::Param(p)) | Predicate::Ne(_, Operand::Param(p)) => {
                if !out.contains(p) {
                    out.push(*p);
                }
            }
            Predicate::And(parts) | Predicate::Or(parts) => {
                for part in parts {
                    part.collect_params(out);
                }
            }
            Predicate::Not(inner) => inner.collect_params(out),
            Predicate::Const(_)
            | Predicate::Eq(..)
            | Predicate::Ne(..)
            | Predicate::IsNull(_)
            | Predicate::In(..) => {}
        }
    }

    /// Replace parameter references with the values aligned to `decls`.
    ///
    /// # Errors
    /// Returns [`UnboundParam`] if the template references a parameter not in `decls`.
    pub fn bind(
        &self,
        decls: &[ParamDecl],
        values: &[Value],
    ) -> Result<BoundPredicate, UnboundParam> {
        let resolve = |operand: &Operand| -> Result<Value, UnboundParam> {
            match operand {
                Operand::Literal(v) => Ok(v.clone()),
                Operand::Param(name) => decls
                    .iter()
                    .position(|d| d.name() == *name)
                    .and_then(|i| values.get(i))
                    .cloned()
                    .ok_or(UnboundParam(*name)),
            }
        };

        Ok(match self {
            Predicate::Const(b) => BoundPredicate::Const(*b),
            Predicate::Eq(field, rhs) => match resolve(rhs)? {
                Value::Null => BoundPredicate::IsNull(*field),
                v => BoundPredicate::Eq(*field, v),
            },
            Predicate::Ne(field, rhs) => match resolve(rhs)? {
                Value::Null => BoundPredicate::Not(Box::new(BoundPredicate::IsNull(*field))),
                v => BoundPredicate::Ne(*field, v),
            },
            Predicate::IsNull(field) => BoundPredicate::IsNull(*field),
            Predicate::In(field, list) => BoundPredicate::In(*field, list.clone()),
            Predicate::And(parts) => BoundPredicate::And(
                parts
                    .iter()
                    .map(|p| p.bind(decls, values))
                    .collect::<Result<_, _>>()?,
            ),
            Predicate::Or(parts) => BoundPredicate::Or(
                parts
                    .iter()
                    .map(|p| p.bind(decls, values))
                    .collect::<Result<_, _>>()?,
            ),
            Predicate::Not(inner) => BoundPredicate::Not(Box::new(inner.bind(decls, values)?)),
        })
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self))
    }
}

/// Concrete predicate with every parameter resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundPredicate {
    Const(bool),
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    IsNull(&'static str),
    In(&'static str, Vec<Value>),
    And(Vec<BoundPredicate>),
    Or(Vec<BoundPredicate>),
    Not(Box<BoundPredicate>),
}

impl BoundPredicate {
    /// Conjoin a list of predicates. An empty list is `None` (no restriction).
    #[must_use]
    pub fn conjoin(mut parts: Vec<BoundPredicate>) -> Option<BoundPredicate> {
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(BoundPredicate::And(parts)),
        }
    }

    /// Fields referenced by the predicate, in first-use order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<&'static str>) {
        match self {
            BoundPredicate::Eq(f, _)
            | BoundPredicate::Ne(f, _)
            | BoundPredicate::IsNull(f)
            | BoundPredicate::In(f, _) => {
                if !out.contains(f) {
                    out.push(*f);
                }
            }
            BoundPredicate::And(parts) | BoundPredicate::Or(parts) => {
                for part in parts {
                    part.collect_fields(out);
                }
            }
            BoundPredicate::Not(inner) => inner.collect_fields(out),
            BoundPredicate::Const(_) => {}
        }
    }

    /// Evaluate against an entity; `true` only when the predicate definitely holds.
    ///
    /// # Errors
    /// Returns the name of the first referenced field the entity does not expose.
    pub fn matches<E: FieldAccess>(&self, entity: &E) -> Result<bool, &'static str> {
        Ok(self.eval(entity)? == Some(true))
    }

    fn eval<E: FieldAccess>(&self, entity: &E) -> Result<Option<bool>, &'static str> {
        let read = |field: &'static str| entity.field(field).ok_or(field);

        Ok(match self {
            BoundPredicate::Const(b) => Some(*b),
            BoundPredicate::Eq(f, v) => match read(*f)? {
                Value::Null => None,
                actual => Some(actual == *v),
            },
            BoundPredicate::Ne(f, v) => match read(*f)? {
                Value::Null => None,
                actual => Some(actual != *v),
            },
            BoundPredicate::IsNull(f) => Some(read(*f)?.is_null()),
            BoundPredicate::In(f, values) => match read(*f)? {
                _ if values.is_empty() => Some(false),
                Value::Null => None,
                actual if values.contains(&actual) => Some(true),
                // `x IN (.., NULL)` without a match is unknown, not false.
                _ if values.iter().any(Value::is_null) => None,
                _ => Some(false),
            },
            BoundPredicate::And(parts) => {
                let mut acc = Some(true);
                for part in parts {
                    match part.eval(entity)? {
                        Some(false) => return Ok(Some(false)),
                        None => acc = None,
                        Some(true) => {}
                    }
                }
                acc
            }
            BoundPredicate::Or(parts) => {
                let mut acc = Some(false);
                for part in parts {
                    match part.eval(entity)? {
                        Some(true) => return Ok(Some(true)),
                        None => acc = None,
                        Some(false) => {}
                    }
                }
                acc
            }
            BoundPredicate::Not(inner) => inner.eval(entity)?.map(|b| !b),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::capability::{Capability, FilterableEntity};
    use crate::value::ValueKind;
    use uuid::Uuid;

    struct Row {
        tenant_id: Option<Uuid>,
    }

    impl FilterableEntity for Row {
        const NAME: &'static str = "row";
        const CAPABILITIES: &'static [Capability] = &[Capability::TENANT_OPTIONAL];
    }

    impl FieldAccess for Row {
        fn field(&self, name: &str) -> Option<Value> {
            (name == "tenant_id").then(|| Value::from(self.tenant_id))
        }
    }

    fn row(tenant_id: Option<Uuid>) -> Row {
        Row { tenant_id }
    }

    fn tenant_template() -> Predicate {
        Predicate::any(vec![
            Predicate::field_eq("tenant_id", Operand::param("tenant_id")),
            Predicate::field_is_null("tenant_id"),
        ])
    }

    fn tenant_decl() -> Vec<ParamDecl> {
        vec![ParamDecl::new("tenant_id", ValueKind::Uuid, Value::Null).nullable()]
    }

    #[test]
    fn binds_params_and_collects_names() {
        let t = Uuid::new_v4();
        let bound = tenant_template()
            .bind(&tenant_decl(), &[Value::Uuid(t)])
            .unwrap();
        assert_eq!(
            bound,
            BoundPredicate::Or(vec![
                BoundPredicate::Eq("tenant_id", Value::Uuid(t)),
                BoundPredicate::IsNull("tenant_id"),
            ])
        );
        assert_eq!(tenant_template().params(), vec!["tenant_id"]);
        assert_eq!(bound.fields(), vec!["tenant_id"]);
    }

    #[test]
    fn null_param_binds_to_is_null() {
        let bound = Predicate::field_eq("tenant_id", Operand::param("tenant_id"))
            .bind(&tenant_decl(), &[Value::Null])
            .unwrap();
        assert_eq!(bound, BoundPredicate::IsNull("tenant_id"));
    }

    #[test]
    fn unknown_param_is_reported() {
        let err = Predicate::field_eq("tenant_id", Operand::param("other"))
            .bind(&tenant_decl(), &[Value::Null])
            .unwrap_err();
        assert_eq!(err, UnboundParam("other"));
    }

    #[test]
    fn three_valued_logic_keeps_null_comparisons_out() {
        let t = Uuid::new_v4();
        let host_row = row(None);
        let eq = BoundPredicate::Eq("tenant_id", Value::Uuid(t));
        assert!(!eq.matches(&host_row).unwrap());
        let not_eq = BoundPredicate::Not(Box::new(eq.clone()));
        assert!(!not_eq.matches(&host_row).unwrap());

        let either = BoundPredicate::Or(vec![eq, BoundPredicate::IsNull("tenant_id")]);
        assert!(either.matches(&host_row).unwrap());
        assert!(either.matches(&row(Some(t))).unwrap());
        assert!(!either.matches(&row(Some(Uuid::new_v4()))).unwrap());
    }

    #[test]
    fn empty_in_list_is_false_even_for_null_fields() {
        let empty = BoundPredicate::In("tenant_id", vec![]);
        let negated = BoundPredicate::Not(Box::new(empty.clone()));
        for r in [row(None), row(Some(Uuid::new_v4()))] {
            assert!(!empty.matches(&r).unwrap());
            assert!(negated.matches(&r).unwrap());
        }
    }

    #[test]
    fn in_list_with_null_member_is_unknown_without_a_match() {
        let t = Uuid::new_v4();
        let list = BoundPredicate::In("tenant_id", vec![Value::Null, Value::Uuid(t)]);
        let negated = BoundPredicate::Not(Box::new(list.clone()));

        assert!(list.matches(&row(Some(t))).unwrap());
        assert!(!negated.matches(&row(Some(t))).unwrap());

        for r in [row(None), row(Some(Uuid::new_v4()))] {
            assert!(!list.matches(&r).unwrap());
            assert!(!negated.matches(&r).unwrap());
        }

        let without_null = BoundPredicate::In("tenant_id", vec![Value::Uuid(t)]);
        let not_in = BoundPredicate::Not(Box::new(without_null));
        assert!(not_in.matches(&row(Some(Uuid::new_v4()))).unwrap());
        assert!(!not_in.matches(&row(None)).unwrap());
    }

    #[test]
    fn missing_field_surfaces_name() {
        let p = BoundPredicate::Eq("is_deleted", Value::Bool(false));
        assert_eq!(p.matches(&row(None)), Err("is_deleted"));
    }

    #[test]
    fn conjoin_shapes() {
        assert_eq!(BoundPredicate::conjoin(vec![]), None);
        let one = BoundPredicate::Const(true);
        assert_eq!(
            BoundPredicate::conjoin(vec![one.clone()]),
            Some(one.clone())
        );
        assert_eq!(
            BoundPredicate::conjoin(vec![one.clone(), one.clone()]),
            Some(BoundPredicate::And(vec![one.clone(), one]))
        );
    }
}
