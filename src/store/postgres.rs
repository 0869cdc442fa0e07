use anyhow::{anyhow, Context, Result};
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Postgres, QueryBuilder, Row, Transaction,
};

use crate::model::{
    AssociationQuery, DataModel, DataModelType, ElementType, Entity, EntityAssociation, Id,
    NewEntityAssociation, ScopeFilter,
};
use crate::store::traits::{MdrSession, MdrStore};

const ASSOCIATION_COLUMNS: &str = "ea.id, ea.parent_entity_id, ea.child_entity_id, ea.relationship, \
     ea.placement, ea.notes, ea.creation_date, ea.activation_date, ea.deprecation_date, \
     ea.contributor, ea.contributor_organization, ea.extension, ea.extended_by_data_model_id, ea.deleted";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MdrStore for PostgresStore {
    type Session = PgSession;

    async fn begin(&self) -> Result<PgSession> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(PgSession { tx })
    }
}

/// One PostgreSQL transaction. Rolled back on drop unless committed.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

fn entity_from_row(row: &PgRow) -> Result<Entity> {
    Ok(Entity {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        unique_name: row.try_get("unique_name")?,
        description: row.try_get("description")?,
        data_model_id: row.try_get("data_model_id")?,
        extension: row.try_get("extension")?,
        creation_date: row.try_get("creation_date")?,
        deleted: row.try_get("deleted")?,
    })
}

fn data_model_from_row(row: &PgRow) -> Result<DataModel> {
    let model_type: String = row.try_get("model_type")?;
    let model_type = model_type
        .parse::<DataModelType>()
        .map_err(|e| anyhow!(e))?;

    Ok(DataModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        data_model_version: row.try_get("data_model_version")?,
        base_data_model_id: row.try_get("base_data_model_id")?,
        model_type,
        deleted: row.try_get("deleted")?,
    })
}

fn association_from_row(row: &PgRow) -> Result<EntityAssociation> {
    Ok(EntityAssociation {
        id: row.try_get("id")?,
        parent_entity_id: row.try_get("parent_entity_id")?,
        child_entity_id: row.try_get("child_entity_id")?,
        relationship: row.try_get("relationship")?,
        placement: row.try_get("placement")?,
        notes: row.try_get("notes")?,
        creation_date: row.try_get("creation_date")?,
        activation_date: row.try_get("activation_date")?,
        deprecation_date: row.try_get("deprecation_date")?,
        contributor: row.try_get("contributor")?,
        contributor_organization: row.try_get("contributor_organization")?,
        extension: row.try_get("extension")?,
        extended_by_data_model_id: row.try_get("extended_by_data_model_id")?,
        deleted: row.try_get("deleted")?,
    })
}

/// Translate an association filter into a single SELECT.
fn build_association_query(query: &AssociationQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM entity_associations ea",
        ASSOCIATION_COLUMNS
    ));

    if query.parent_data_model_id.is_some() {
        qb.push(" JOIN entities pe ON pe.id = ea.parent_entity_id");
    }
    if query.child_data_model_id.is_some() {
        qb.push(" JOIN entities ce ON ce.id = ea.child_entity_id");
    }

    qb.push(" WHERE ea.deleted = FALSE");

    if let Some(id) = query.parent_entity_id {
        qb.push(" AND ea.parent_entity_id = ").push_bind(id);
    }
    if let Some(id) = query.child_entity_id {
        qb.push(" AND ea.child_entity_id = ").push_bind(id);
    }
    if let Some(relationship) = &query.relationship {
        qb.push(" AND ea.relationship = ")
            .push_bind(relationship.clone());
    }
    if let Some(ids) = &query.parent_entity_ids {
        qb.push(" AND ea.parent_entity_id = ANY(")
            .push_bind(ids.clone())
            .push(")");
    }
    if let Some(ids) = &query.child_entity_ids {
        qb.push(" AND ea.child_entity_id = ANY(")
            .push_bind(ids.clone())
            .push(")");
    }
    if let Some(data_model_id) = query.parent_data_model_id {
        qb.push(" AND pe.data_model_id = ").push_bind(data_model_id);
    }
    if let Some(data_model_id) = query.child_data_model_id {
        qb.push(" AND ce.data_model_id = ").push_bind(data_model_id);
    }
    if let Some(id) = query.excluded_id {
        qb.push(" AND ea.id <> ").push_bind(id);
    }

    match query.scope {
        ScopeFilter::Any => {}
        ScopeFilter::BaseOnly => {
            qb.push(" AND ea.extended_by_data_model_id IS NULL");
        }
        ScopeFilter::BaseOr(data_model_id) => {
            qb.push(" AND (ea.extended_by_data_model_id IS NULL OR ea.extended_by_data_model_id = ")
                .push_bind(data_model_id)
                .push(")");
        }
    }

    qb.push(" ORDER BY ea.id");
    qb
}

#[async_trait::async_trait]
impl MdrSession for PgSession {
    async fn get_entity(&mut self, id: Id) -> Result<Option<Entity>> {
        let row = sqlx::query(
            "SELECT id, name, unique_name, description, data_model_id, extension, creation_date, deleted \
             FROM entities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch entity")?;

        row.as_ref().map(entity_from_row).transpose()
    }

    async fn find_entity_id(&mut self, name: &str, data_model_id: Id) -> Result<Option<Id>> {
        let row = sqlx::query(
            "SELECT id FROM entities WHERE name = $1 AND data_model_id = $2 AND deleted = FALSE ORDER BY id LIMIT 1",
        )
        .bind(name)
        .bind(data_model_id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to look up entity by name")?;

        match row {
            Some(row) => Ok(Some(row.try_get("id")?)),
            None => Ok(None),
        }
    }

    async fn get_data_model(&mut self, id: Id) -> Result<Option<DataModel>> {
        let row = sqlx::query(
            "SELECT id, name, description, data_model_version, base_data_model_id, model_type, deleted \
             FROM data_models WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch data model")?;

        row.as_ref().map(data_model_from_row).transpose()
    }

    async fn find_data_model_id(&mut self, name: &str, version: Option<&str>) -> Result<Option<Id>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM data_models WHERE deleted = FALSE AND name = ");
        qb.push_bind(name.to_string());
        if let Some(version) = version {
            qb.push(" AND data_model_version = ")
                .push_bind(version.to_string());
        }
        qb.push(" ORDER BY id LIMIT 1");

        let row = qb
            .build()
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to look up data model by name")?;

        match row {
            Some(row) => Ok(Some(row.try_get("id")?)),
            None => Ok(None),
        }
    }

    async fn included_element_ids(
        &mut self,
        ext_data_model_id: Id,
        element_type: ElementType,
    ) -> Result<Vec<Id>> {
        let rows = sqlx::query(
            "SELECT included_element_id FROM ext_inclusions_from_base_dm \
             WHERE ext_data_model_id = $1 AND element_type = $2 AND deleted = FALSE",
        )
        .bind(ext_data_model_id)
        .bind(element_type.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list extension inclusions")?;

        rows.iter()
            .map(|row| row.try_get("included_element_id").map_err(Into::into))
            .collect()
    }

    async fn get_association(&mut self, id: Id) -> Result<Option<EntityAssociation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entity_associations ea WHERE ea.id = $1",
            ASSOCIATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch entity association")?;

        row.as_ref().map(association_from_row).transpose()
    }

    async fn find_associations(&mut self, query: &AssociationQuery) -> Result<Vec<EntityAssociation>> {
        let mut qb = build_association_query(query);
        let rows = qb
            .build()
            .fetch_all(&mut *self.tx)
            .await
            .context("Failed to query entity associations")?;

        rows.iter().map(association_from_row).collect()
    }

    async fn insert_association(&mut self, association: NewEntityAssociation) -> Result<EntityAssociation> {
        let row = sqlx::query(
            r#"
            INSERT INTO entity_associations AS ea (
                parent_entity_id, child_entity_id, relationship, placement, notes,
                creation_date, activation_date, deprecation_date,
                contributor, contributor_organization, extension, extended_by_data_model_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING ea.id, ea.parent_entity_id, ea.child_entity_id, ea.relationship,
                ea.placement, ea.notes, ea.creation_date, ea.activation_date, ea.deprecation_date,
                ea.contributor, ea.contributor_organization, ea.extension,
                ea.extended_by_data_model_id, ea.deleted
            "#,
        )
        .bind(association.parent_entity_id)
        .bind(association.child_entity_id)
        .bind(&association.relationship)
        .bind(&association.placement)
        .bind(&association.notes)
        .bind(association.creation_date)
        .bind(association.activation_date)
        .bind(association.deprecation_date)
        .bind(&association.contributor)
        .bind(&association.contributor_organization)
        .bind(association.extension)
        .bind(association.extended_by_data_model_id)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert entity association")?;

        association_from_row(&row)
    }

    async fn save_association(&mut self, association: &EntityAssociation) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE entity_associations SET
                parent_entity_id = $2,
                child_entity_id = $3,
                relationship = $4,
                placement = $5,
                notes = $6,
                creation_date = $7,
                activation_date = $8,
                deprecation_date = $9,
                contributor = $10,
                contributor_organization = $11,
                extension = $12,
                extended_by_data_model_id = $13,
                deleted = $14
            WHERE id = $1
            "#,
        )
        .bind(association.id)
        .bind(association.parent_entity_id)
        .bind(association.child_entity_id)
        .bind(&association.relationship)
        .bind(&association.placement)
        .bind(&association.notes)
        .bind(association.creation_date)
        .bind(association.activation_date)
        .bind(association.deprecation_date)
        .bind(&association.contributor)
        .bind(&association.contributor_organization)
        .bind(association.extension)
        .bind(association.extended_by_data_model_id)
        .bind(association.deleted)
        .execute(&mut *self.tx)
        .await
        .context("Failed to update entity association")?;

        Ok(())
    }

    async fn delete_association(&mut self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entity_associations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context("Failed to delete entity association")?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit transaction")?;
        Ok(())
    }
}
