use modkit_filter::FilterableEntity;
use sea_orm::EntityTrait;

/// Maps capability fields of a `SeaORM` entity to its columns.
///
/// Capabilities come from [`FilterableEntity`]; this trait only tells the
/// query builder which column backs each field a filter predicate references.
///
/// # Example
/// ```rust,ignore
/// impl FilterableEntity for person::Entity {
///     const NAME: &'static str = "person";
///     const CAPABILITIES: &'static [Capability] =
///         &[Capability::SOFT_DELETABLE, Capability::TENANT_BOUND];
/// }
///
/// impl FilterableColumns for person::Entity {
///     fn column(field: &str) -> Option<Self::Column> {
///         match field {
///             fields::IS_DELETED => Some(person::Column::IsDeleted),
///             fields::TENANT_ID => Some(person::Column::TenantId),
///             _ => None,
///         }
///     }
///
///     fn id_col() -> Option<Self::Column> {
///         Some(person::Column::Id)
///     }
/// }
/// ```
pub trait FilterableColumns: FilterableEntity + EntityTrait {
    /// Column backing `field`, or `None` if the entity does not store it.
    fn column(field: &str) -> Option<Self::Column>;

    /// Column holding the row identifier used by `find_by_id` and `soft_delete_by_id`.
    fn id_col() -> Option<Self::Column>;
}
