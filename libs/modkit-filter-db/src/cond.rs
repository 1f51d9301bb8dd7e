use modkit_filter::{BoundPredicate, Value};
use sea_orm::{ColumnTrait, Condition, Value as DbValue, sea_query::Expr};

use crate::entity::FilterableColumns;
use crate::error::FilterDbError;

/// Lowers a bound filter predicate into a `SeaORM` `Condition` over `E`.
///
/// Columns are qualified with the entity's table so the same condition is
/// valid on the base entity and on an entity joined into the query.
///
/// # Rules
/// - `Eq` / `Ne` / `In` compare the mapped column with the bound values
/// - `IsNull` becomes `column IS NULL`
/// - Empty `And` is true, empty `Or` and empty `In` are false
/// - A null member of an `In` list never matches but makes a miss unknown
///
/// # Errors
/// Returns `FilterDbError::UnmappedField` if the predicate references a field
/// `E` maps to no column.
pub fn build_filter_condition<E>(predicate: &BoundPredicate) -> Result<Condition, FilterDbError>
where
    E: FilterableColumns,
    E::Column: ColumnTrait + Copy,
{
    let cond = match predicate {
        BoundPredicate::Const(b) => Condition::all().add(Expr::value(*b)),
        BoundPredicate::Eq(field, v) => Condition::all().add(column::<E>(*field)?.eq(db_value(v))),
        BoundPredicate::Ne(field, v) => Condition::all().add(column::<E>(*field)?.ne(db_value(v))),
        BoundPredicate::IsNull(field) => Condition::all().add(column::<E>(*field)?.is_null()),
        BoundPredicate::In(field, values) => in_condition(column::<E>(*field)?, values),
        BoundPredicate::And(parts) if parts.is_empty() => Condition::all().add(Expr::value(true)),
        BoundPredicate::Or(parts) if parts.is_empty() => Condition::all().add(Expr::value(false)),
        BoundPredicate::And(parts) => {
            let mut cond = Condition::all();
            for part in parts {
                cond = cond.add(build_filter_condition::<E>(part)?);
            }
            cond
        }
        BoundPredicate::Or(parts) => {
            let mut cond = Condition::any();
            for part in parts {
                cond = cond.add(build_filter_condition::<E>(part)?);
            }
            cond
        }
        BoundPredicate::Not(inner) => build_filter_condition::<E>(inner)?.not(),
    };
    Ok(cond)
}

/// Null members become an unknown disjunct rather than a typed null inside
/// the `IN` list.
fn in_condition(col: Expr, values: &[Value]) -> Condition {
    if values.is_empty() {
        return Condition::all().add(Expr::value(false));
    }
    let present: Vec<DbValue> = values
        .iter()
        .filter(|v| !v.is_null())
        .map(db_value)
        .collect();
    let has_null = present.len() < values.len();
    let mut cond = Condition::any();
    if !present.is_empty() {
        cond = cond.add(col.is_in(present));
    }
    if has_null {
        cond = cond.add(Expr::value(DbValue::Bool(None)));
    }
    cond
}

fn column<E>(field: &'static str) -> Result<Expr, FilterDbError>
where
    E: FilterableColumns,
    E::Column: ColumnTrait + Copy,
{
    let col = E::column(field).ok_or(FilterDbError::UnmappedField {
        entity: E::NAME,
        field,
    })?;
    Ok(Expr::col((E::default(), col)))
}

fn db_value(v: &Value) -> DbValue {
    match v {
        Value::Null => DbValue::Bool(None),
        Value::Bool(b) => DbValue::from(*b),
        Value::I64(i) => DbValue::from(*i),
        Value::String(s) => DbValue::from(s.clone()),
        Value::Uuid(u) => DbValue::from(*u),
    }
}
