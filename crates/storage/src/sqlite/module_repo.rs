use algolearn_core::model::{Module, ModuleId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_section_row, module_id_from_i64, ser};
use crate::records::SectionRecord;
use crate::repository::{ModuleListing, ModuleRepository, StorageError};

#[async_trait::async_trait]
impl ModuleRepository for SqliteRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let module_id = id_to_i64("module_id", module.id().value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO modules (id, title)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title
            ",
        )
        .bind(module_id)
        .bind(module.title())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // Sections are replaced wholesale; learner progress rows are keyed by id and survive.
        sqlx::query("DELETE FROM sections WHERE module_id = ?1")
            .bind(module_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for section in module.sections() {
            let record = SectionRecord::from_section(section)?;
            let content = serde_json::to_string(&record.content).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO sections (id, module_id, position, kind, content)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(id_to_i64("section_id", record.id.value())?)
            .bind(module_id)
            .bind(i64::from(record.position))
            .bind(record.kind)
            .bind(content)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Module, StorageError> {
        let module_id = id_to_i64("module_id", id.value())?;

        let row = sqlx::query("SELECT title FROM modules WHERE id = ?1")
            .bind(module_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;
        let title: String = row.try_get("title").map_err(ser)?;

        let rows = sqlx::query(
            r"
            SELECT id, position, kind, content
            FROM sections
            WHERE module_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in &rows {
            sections.push(map_section_row(row)?);
        }

        Module::new(id, title, sections).map_err(ser)
    }

    async fn list_modules(&self, limit: u32) -> Result<Vec<ModuleListing>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT m.id, m.title, COUNT(s.id) AS section_count
            FROM modules m
            LEFT JOIN sections s ON s.module_id = m.id
            GROUP BY m.id, m.title
            ORDER BY m.id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let count: i64 = row.try_get("section_count").map_err(ser)?;
            out.push(ModuleListing {
                id: module_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
                title: row.try_get("title").map_err(ser)?,
                section_count: u32::try_from(count).map_err(ser)?,
            });
        }
        Ok(out)
    }
}
