//! `PostgreSQL` list repository.
//!
//! Each list is one row in `shoplist.shopping_list`. The aggregate itself is
//! stored as a JSONB document; `awid`, `owner_identity`, `member_identities`,
//! `state` and `updated_at` are copied out of it on every save so list queries
//! can use indexes.

use async_trait::async_trait;
use sqlx::PgPool;

use shoplist_core::{ListId, Page, ShoppingList};

use super::{ListQuery, ListRepository, RepositoryError};

/// Repository backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgListRepository {
    pool: PgPool,
}

impl PgListRepository {
    /// Create a new list repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ListRepository for PgListRepository {
    async fn find_by_id(&self, id: ListId) -> Result<Option<ShoppingList>, RepositoryError> {
        let document: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            SELECT document
            FROM shoplist.shopping_list
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        document.map(decode_document).transpose()
    }

    async fn find(&self, query: &ListQuery) -> Result<Page<ShoppingList>, RepositoryError> {
        let state = query.state.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM shoplist.shopping_list
            WHERE awid = $1
              AND $2 = ANY(member_identities)
              AND ($3::text IS NULL OR state = $3)
            ",
        )
        .bind(query.awid.as_str())
        .bind(query.member.as_str())
        .bind(state)
        .fetch_one(&self.pool)
        .await?;

        let limit = i64::from(query.page.page_size);
        let offset = i64::try_from(query.page.offset()).unwrap_or(i64::MAX);
        let documents: Vec<serde_json::Value> = sqlx::query_scalar(
            r"
            SELECT document
            FROM shoplist.shopping_list
            WHERE awid = $1
              AND $2 = ANY(member_identities)
              AND ($3::text IS NULL OR state = $3)
            ORDER BY updated_at DESC, id ASC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(query.awid.as_str())
        .bind(query.member.as_str())
        .bind(state)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items = documents
            .into_iter()
            .map(decode_document)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            request: query.page,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn save(&self, list: &ShoppingList) -> Result<(), RepositoryError> {
        let document = serde_json::to_value(list)
            .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode list: {e}")))?;
        let members: Vec<String> = list
            .member_identities()
            .map(|m| m.as_str().to_owned())
            .collect();

        sqlx::query(
            r"
            INSERT INTO shoplist.shopping_list
                (id, awid, owner_identity, member_identities, state, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                member_identities = EXCLUDED.member_identities,
                state = EXCLUDED.state,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(list.id())
        .bind(list.awid().as_str())
        .bind(list.owner().as_str())
        .bind(&members)
        .bind(list.state().as_str())
        .bind(document)
        .bind(list.created_at())
        .bind(list.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_id(&self, id: ListId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shoplist.shopping_list WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Decode a stored document, re-checking every aggregate invariant.
fn decode_document(document: serde_json::Value) -> Result<ShoppingList, RepositoryError> {
    serde_json::from_value(document)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid list document: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use shoplist_core::{Awid, Identity, ListName};

    use super::*;

    #[test]
    fn test_decode_valid_document() {
        let list = ShoppingList::new(
            ListId::generate(),
            Awid::parse("awid-1").unwrap(),
            ListName::parse("Groceries").unwrap(),
            Identity::parse("alice").unwrap(),
            Utc::now(),
        );
        let decoded = decode_document(serde_json::to_value(&list).unwrap()).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_decode_document_without_owner_is_corruption() {
        let document = json!({
            "id": ListId::generate(),
            "awid": "awid-1",
            "name": "Groceries",
            "state": "active",
            "ownerUuIdentity": "alice",
            "members": [],
            "items": [],
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        assert!(matches!(
            decode_document(document),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_decode_document_with_blank_name_is_corruption() {
        let list = ShoppingList::new(
            ListId::generate(),
            Awid::parse("awid-1").unwrap(),
            ListName::parse("Groceries").unwrap(),
            Identity::parse("alice").unwrap(),
            Utc::now(),
        );
        let mut document = serde_json::to_value(&list).unwrap();
        document["name"] = json!("   ");
        assert!(decode_document(document).is_err());
    }
}
