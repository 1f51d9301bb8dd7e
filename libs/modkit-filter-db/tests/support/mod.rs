#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Entities, schema and seed data shared by the `SQLite` integration tests.

use std::sync::Arc;

use modkit_filter::{
    Capability, FieldAccess, FilterDefinition, FilterRegistry, FilterableEntity, Operand,
    ParamDecl, Predicate, Value, ValueKind, fields,
};
use modkit_filter_db::{FilterableColumns, FilteredConn};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

pub mod person {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "people")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub tenant_id: Uuid,
        pub name: String,
        pub is_deleted: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::pet::Entity")]
        Pet,
    }

    impl Related<super::pet::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Pet.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod pet {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "pets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub person_id: i64,
        pub name: String,
        pub is_deleted: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::person::Entity",
            from = "Column::PersonId",
            to = "super::person::Column::Id"
        )]
        Person,
    }

    impl Related<super::person::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Person.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod setting {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub tenant_id: Option<Uuid>,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod shop {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "shops")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub region: String,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod audit {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "audit_log")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub message: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl FilterableEntity for person::Entity {
    const NAME: &'static str = "person";
    const CAPABILITIES: &'static [Capability] =
        &[Capability::SOFT_DELETABLE, Capability::TENANT_BOUND];
}

impl FilterableColumns for person::Entity {
    fn column(field: &str) -> Option<Self::Column> {
        match field {
            fields::IS_DELETED => Some(person::Column::IsDeleted),
            fields::TENANT_ID => Some(person::Column::TenantId),
            _ => None,
        }
    }

    fn id_col() -> Option<Self::Column> {
        Some(person::Column::Id)
    }
}

impl FilterableEntity for pet::Entity {
    const NAME: &'static str = "pet";
    const CAPABILITIES: &'static [Capability] = &[Capability::SOFT_DELETABLE];
}

impl FilterableColumns for pet::Entity {
    fn column(field: &str) -> Option<Self::Column> {
        match field {
            fields::IS_DELETED => Some(pet::Column::IsDeleted),
            _ => None,
        }
    }

    fn id_col() -> Option<Self::Column> {
        Some(pet::Column::Id)
    }
}

impl FilterableEntity for setting::Entity {
    const NAME: &'static str = "setting";
    const CAPABILITIES: &'static [Capability] = &[Capability::TENANT_OPTIONAL];
}

impl FilterableColumns for setting::Entity {
    fn column(field: &str) -> Option<Self::Column> {
        match field {
            fields::TENANT_ID => Some(setting::Column::TenantId),
            _ => None,
        }
    }

    fn id_col() -> Option<Self::Column> {
        Some(setting::Column::Id)
    }
}

impl FilterableEntity for setting::Model {
    const NAME: &'static str = "setting";
    const CAPABILITIES: &'static [Capability] = &[Capability::TENANT_OPTIONAL];
}

impl FieldAccess for setting::Model {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::TENANT_ID => Some(Value::from(self.tenant_id)),
            _ => None,
        }
    }
}

pub const REGIONAL: Capability = Capability::new("regional");
pub const REGION: &str = "Region";

/// Keeps rows of the region bound to the `region` parameter, `"eu"` by default.
pub fn region_filter() -> FilterDefinition {
    FilterDefinition::new(
        REGION,
        REGIONAL,
        Predicate::field_eq("region", Operand::param("region")),
    )
    .with_param(ParamDecl::new("region", ValueKind::String, "eu"))
}

impl FilterableEntity for shop::Entity {
    const NAME: &'static str = "shop";
    const CAPABILITIES: &'static [Capability] = &[REGIONAL];
}

impl FilterableColumns for shop::Entity {
    fn column(field: &str) -> Option<Self::Column> {
        match field {
            "region" => Some(shop::Column::Region),
            _ => None,
        }
    }

    fn id_col() -> Option<Self::Column> {
        Some(shop::Column::Id)
    }
}

impl FilterableEntity for audit::Entity {
    const NAME: &'static str = "audit";
    const CAPABILITIES: &'static [Capability] = &[];
}

impl FilterableColumns for audit::Entity {
    fn column(_field: &str) -> Option<Self::Column> {
        None
    }

    fn id_col() -> Option<Self::Column> {
        Some(audit::Column::Id)
    }
}

pub const SEVEN: Uuid = Uuid::from_u128(7);
pub const EIGHT: Uuid = Uuid::from_u128(8);

/// In-memory database with the schema created and the fixture rows inserted.
///
/// People: 1 (7), 2 (7, deleted), 3 (7), 4 (8), 5 (8, deleted).
/// Pets: 10 and 11 (deleted) belong to person 1, 12 to person 4.
/// Settings: 20 (host-owned), 21 (7), 22 (8).
/// Shops: 40 and 42 in "eu", 41 in "us".
pub async fn seeded_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    create_schema(&db).await;

    for (id, tenant_id, name, is_deleted) in [
        (1, SEVEN, "alice", false),
        (2, SEVEN, "bob", true),
        (3, SEVEN, "carol", false),
        (4, EIGHT, "dave", false),
        (5, EIGHT, "erin", true),
    ] {
        person::Entity::insert(person::ActiveModel {
            id: Set(id),
            tenant_id: Set(tenant_id),
            name: Set(name.to_owned()),
            is_deleted: Set(is_deleted),
        })
        .exec(&db)
        .await
        .expect("Failed to seed person");
    }

    for (id, person_id, name, is_deleted) in [
        (10, 1, "rex", false),
        (11, 1, "tom", true),
        (12, 4, "kit", false),
    ] {
        pet::Entity::insert(pet::ActiveModel {
            id: Set(id),
            person_id: Set(person_id),
            name: Set(name.to_owned()),
            is_deleted: Set(is_deleted),
        })
        .exec(&db)
        .await
        .expect("Failed to seed pet");
    }

    for (id, tenant_id, name) in [
        (20, None, "theme"),
        (21, Some(SEVEN), "locale"),
        (22, Some(EIGHT), "currency"),
    ] {
        setting::Entity::insert(setting::ActiveModel {
            id: Set(id),
            tenant_id: Set(tenant_id),
            name: Set(name.to_owned()),
        })
        .exec(&db)
        .await
        .expect("Failed to seed setting");
    }

    for (id, region, name) in [
        (40, "eu", "lisbon"),
        (41, "us", "austin"),
        (42, "eu", "oslo"),
    ] {
        shop::Entity::insert(shop::ActiveModel {
            id: Set(id),
            region: Set(region.to_owned()),
            name: Set(name.to_owned()),
        })
        .exec(&db)
        .await
        .expect("Failed to seed shop");
    }

    audit::Entity::insert(audit::ActiveModel {
        id: Set(30),
        message: Set("created".to_owned()),
    })
    .exec(&db)
    .await
    .expect("Failed to seed audit log");

    db
}

async fn create_schema(db: &DatabaseConnection) {
    for ddl in [
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY NOT NULL,
            tenant_id TEXT NOT NULL,
            name TEXT NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        )",
        "CREATE TABLE pets (
            id INTEGER PRIMARY KEY NOT NULL,
            person_id INTEGER NOT NULL REFERENCES people(id),
            name TEXT NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE
        )",
        "CREATE TABLE settings (
            id INTEGER PRIMARY KEY NOT NULL,
            tenant_id TEXT NULL,
            name TEXT NOT NULL
        )",
        "CREATE TABLE shops (
            id INTEGER PRIMARY KEY NOT NULL,
            region TEXT NOT NULL,
            name TEXT NOT NULL
        )",
        "CREATE TABLE audit_log (
            id INTEGER PRIMARY KEY NOT NULL,
            message TEXT NOT NULL
        )",
    ] {
        db.execute_unprepared(ddl)
            .await
            .expect("Failed to create schema");
    }
}

pub async fn filtered_conn() -> FilteredConn {
    FilteredConn::new(seeded_db().await, registry())
}

pub fn ids<M>(rows: &[M], id: impl Fn(&M) -> i64) -> Vec<i64> {
    let mut out: Vec<i64> = rows.iter().map(id).collect();
    out.sort_unstable();
    out
}

pub fn registry() -> Arc<FilterRegistry> {
    FilterRegistry::with_builtins().unwrap().into_shared()
}
