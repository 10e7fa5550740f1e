//! Argument template CRUD operations.

use crate::error::DatabaseError;
use crate::{Error, Result};

use super::{ArgumentTemplate, Database, NewArgumentTemplate};

impl Database {
    /// Insert a new argument template, returning the stored row
    pub async fn insert_template(&self, template: &NewArgumentTemplate) -> Result<ArgumentTemplate> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            "INSERT INTO argument_templates (name, args, created_at) VALUES (?, ?, ?)",
        )
        .bind(&template.name)
        .bind(&template.args)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert template: {}",
                e
            )))
        })?;

        Ok(ArgumentTemplate {
            id: result.last_insert_rowid(),
            name: template.name.clone(),
            args: template.args.clone(),
            created_at: now,
        })
    }

    /// Get a template by ID
    pub async fn get_template(&self, id: i64) -> Result<Option<ArgumentTemplate>> {
        let row = sqlx::query_as::<_, ArgumentTemplate>(
            "SELECT id, name, args, created_at FROM argument_templates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get template: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all templates, oldest first
    pub async fn list_templates(&self) -> Result<Vec<ArgumentTemplate>> {
        let rows = sqlx::query_as::<_, ArgumentTemplate>(
            "SELECT id, name, args, created_at FROM argument_templates ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list templates: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Update a template's name and args
    ///
    /// Returns the updated row, or `None` if no template has this ID.
    pub async fn update_template(
        &self,
        id: i64,
        template: &NewArgumentTemplate,
    ) -> Result<Option<ArgumentTemplate>> {
        let result = sqlx::query("UPDATE argument_templates SET name = ?, args = ? WHERE id = ?")
            .bind(&template.name)
            .bind(&template.args)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update template: {}",
                    e
                )))
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_template(id).await
    }

    /// Delete a template, returning whether a row was removed
    pub async fn delete_template(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM argument_templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete template: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
