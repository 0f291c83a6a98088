//! Block Repository - the only reader and writer of the `blocks` table.

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use super::content::BlockContent;
use super::error::{BlockError, Result};
use super::migrate::{is_migratable, migrate};
use super::reorder::{assignments_from_ids, move_step, move_to, validate_permutation};
use super::styles::BlockStyles;
use super::types::{Block, BlockType, Direction, OrderAssignment};
use crate::db::models::BlockRow;

impl TryFrom<BlockRow> for Block {
    type Error = BlockError;

    fn try_from(row: BlockRow) -> Result<Self> {
        let block_type: BlockType = row.block_type.parse()?;

        Ok(Block {
            id: row.id,
            block_type,
            block_order: row.block_order,
            content: BlockContent::decode_lenient(block_type, &row.content),
            styles: BlockStyles::decode_lenient(&row.styles).with_defaults(block_type),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BlockRepository {
    pool: SqlitePool,
}

impl BlockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All blocks in render order. Rows with an unknown block type are skipped.
    pub async fn list_all(&self) -> Result<Vec<Block>> {
        let rows = sqlx::query_as::<_, BlockRow>(
            r#"
            SELECT id, block_type, block_order, content, styles, created_at, updated_at
            FROM blocks
            ORDER BY block_order ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Block::try_from(row) {
                    Ok(block) => Some(block),
                    Err(e) => {
                        tracing::warn!(block_id = id, error = %e, "skipping unreadable block");
                        None
                    }
                }
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Block> {
        fetch_row(&self.pool, id)
            .await?
            .ok_or(BlockError::NotFound(id))
            .and_then(Block::try_from)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(count_rows(&self.pool).await?)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a block at `order`. Density is the caller's concern; pass the
    /// current count to append.
    pub async fn create(
        &self,
        block_type: BlockType,
        order: i64,
        content: BlockContent,
        styles: BlockStyles,
    ) -> Result<i64> {
        if order < 0 {
            return Err(BlockError::NegativeOrder(order));
        }
        let content = prepare_content(block_type, content)?;
        let id = insert_row(&self.pool, block_type, order, &content, &styles).await?;

        tracing::info!(block_id = id, block_type = %block_type, block_order = order, "block created");
        Ok(id)
    }

    /// Append a block of `block_type` with default content and styles.
    pub async fn append_default(&self, block_type: BlockType) -> Result<Block> {
        self.append_row(
            block_type,
            BlockContent::default_for(block_type),
            BlockStyles::default_for(block_type),
        )
        .await
    }

    /// Append a block with caller-supplied documents. Counting and inserting
    /// share one transaction, so concurrent appends never share an order.
    pub async fn append_with(
        &self,
        block_type: BlockType,
        content: BlockContent,
        styles: BlockStyles,
    ) -> Result<Block> {
        let content = prepare_content(block_type, content)?;
        self.append_row(block_type, content, styles).await
    }

    async fn append_row(
        &self,
        block_type: BlockType,
        content: BlockContent,
        styles: BlockStyles,
    ) -> Result<Block> {
        let mut tx = self.pool.begin().await?;

        let order = count_rows(&mut *tx).await?;
        let id = insert_row(&mut *tx, block_type, order, &content, &styles).await?;
        let row = fetch_row(&mut *tx, id).await?.ok_or(BlockError::NotFound(id))?;

        tx.commit().await?;

        tracing::info!(block_id = id, block_type = %block_type, block_order = order, "block appended");
        Block::try_from(row)
    }

    /// Replace both documents of a block.
    pub async fn update_content(
        &self,
        id: i64,
        content: BlockContent,
        styles: BlockStyles,
    ) -> Result<()> {
        let stored_type: Option<String> =
            sqlx::query_scalar("SELECT block_type FROM blocks WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let block_type: BlockType = stored_type.ok_or(BlockError::NotFound(id))?.parse()?;

        let content = prepare_content(block_type, content)?;

        let result = sqlx::query(
            r#"
            UPDATE blocks
            SET content = ?, styles = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(content.to_json_string()?)
        .bind(styles.to_json_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BlockError::NotFound(id));
        }

        tracing::info!(block_id = id, "block content updated");
        Ok(())
    }

    /// Single-row order write. Only the reorder protocol calls this, inside its
    /// transaction; on its own it can break density.
    pub(crate) async fn update_order(conn: &mut SqliteConnection, id: i64, order: i64) -> Result<()> {
        let result = sqlx::query("UPDATE blocks SET block_order = ?, updated_at = ? WHERE id = ?")
            .bind(order)
            .bind(Utc::now())
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BlockError::NotFound(id));
        }
        Ok(())
    }

    /// Hard delete. Remaining orders are not compacted.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM blocks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BlockError::NotFound(id));
        }

        tracing::info!(block_id = id, "block deleted");
        Ok(())
    }

    // ========================================================================
    // Reorder protocol
    // ========================================================================

    /// Persist a complete new ordering in one transaction. The assignments must
    /// cover every existing block exactly once with orders `0..N`.
    pub async fn reorder_all(&self, assignments: &[OrderAssignment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        apply_reorder(&mut tx, assignments).await?;
        tx.commit().await?;

        tracing::info!(blocks = assignments.len(), "blocks reordered");
        Ok(())
    }

    /// Reorder by position in `ids`.
    pub async fn reorder_ids(&self, ids: &[i64]) -> Result<()> {
        self.reorder_all(&assignments_from_ids(ids)).await
    }

    /// Swap a block with its neighbour (up/down controls).
    pub async fn move_block(&self, id: i64, direction: Direction) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let ids = ordered_ids(&mut tx).await?.listed;
        let reordered = move_step(&ids, id, direction)?;
        apply_reorder(&mut tx, &assignments_from_ids(&reordered)).await?;
        tx.commit().await?;

        tracing::info!(block_id = id, direction = ?direction, "block moved");
        Ok(())
    }

    /// Move a block to `index` (drag and drop).
    pub async fn move_block_to(&self, id: i64, index: usize) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let ids = ordered_ids(&mut tx).await?.listed;
        let reordered = move_to(&ids, id, index)?;
        apply_reorder(&mut tx, &assignments_from_ids(&reordered)).await?;
        tx.commit().await?;

        tracing::info!(block_id = id, index, "block repositioned");
        Ok(())
    }

    // ========================================================================
    // Migration
    // ========================================================================

    /// Re-read a block, migrate its content and write it back if anything
    /// changed. Read and write share one transaction, so repeating this or
    /// racing another caller never appends boxes twice.
    pub async fn migrate_block(&self, id: i64) -> Result<Block> {
        let mut tx = self.pool.begin().await?;

        let row = fetch_row(&mut *tx, id).await?.ok_or(BlockError::NotFound(id))?;
        let migratable = is_migratable(&row.content);
        let mut block = Block::try_from(row)?;

        let migrated = migrate(block.content.clone());
        if migrated.is_upgraded() && !migratable {
            tracing::warn!(
                block_id = id,
                "stored textBoxes did not decode, leaving legacy content untouched"
            );
        } else if migrated.is_upgraded() {
            let content = migrated.into_inner();
            let now = Utc::now();
            sqlx::query("UPDATE blocks SET content = ?, updated_at = ? WHERE id = ?")
                .bind(content.to_json_string()?)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            block.content = content;
            block.updated_at = now;
            tracing::info!(block_id = id, block_type = %block.block_type, "legacy block content migrated");
        }

        tx.commit().await?;
        Ok(block)
    }

    /// `list_all`, persisting the migration for every block that needs it.
    pub async fn list_migrated(&self) -> Result<Vec<Block>> {
        let blocks = self.list_all().await?;
        let mut migrated = Vec::with_capacity(blocks.len());

        for block in blocks {
            if !migrate(block.content.clone()).is_upgraded() {
                migrated.push(block);
                continue;
            }
            match self.migrate_block(block.id).await {
                Ok(block) => migrated.push(block),
                // Deleted since the listing query ran.
                Err(BlockError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(migrated)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn prepare_content(block_type: BlockType, content: BlockContent) -> Result<BlockContent> {
    if content.block_type() != block_type {
        return Err(BlockError::TypeMismatch {
            expected: block_type,
            actual: content.block_type(),
        });
    }
    content.validate()?;
    Ok(content.sanitized())
}

async fn fetch_row<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> sqlx::Result<Option<BlockRow>> {
    sqlx::query_as::<_, BlockRow>(
        r#"
        SELECT id, block_type, block_order, content, styles, created_at, updated_at
        FROM blocks
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

async fn count_rows<'e, E: SqliteExecutor<'e>>(executor: E) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM blocks")
        .fetch_one(executor)
        .await
}

async fn insert_row<'e, E: SqliteExecutor<'e>>(
    executor: E,
    block_type: BlockType,
    order: i64,
    content: &BlockContent,
    styles: &BlockStyles,
) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO blocks (block_type, block_order, content, styles, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(block_type.as_str())
    .bind(order)
    .bind(content.to_json_string()?)
    .bind(styles.to_json_string())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Block ids in render order, split the way `list_all` sees them.
struct OrderedIds {
    /// Rows `list_all` returns.
    listed: Vec<i64>,
    /// Rows with an unknown block type, which listings skip.
    unlisted: Vec<i64>,
}

async fn ordered_ids(conn: &mut SqliteConnection) -> sqlx::Result<OrderedIds> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, block_type FROM blocks ORDER BY block_order ASC, id ASC")
            .fetch_all(conn)
            .await?;

    let mut ids = OrderedIds {
        listed: Vec::with_capacity(rows.len()),
        unlisted: Vec::new(),
    };
    for (id, block_type) in rows {
        if block_type.parse::<BlockType>().is_ok() {
            ids.listed.push(id);
        } else {
            ids.unlisted.push(id);
        }
    }
    Ok(ids)
}

/// Apply a complete ordering of the listed blocks. Unlisted rows keep their
/// relative order and move behind the listed ones.
async fn apply_reorder(conn: &mut SqliteConnection, assignments: &[OrderAssignment]) -> Result<()> {
    let ids = ordered_ids(&mut *conn).await?;
    validate_permutation(&ids.listed, assignments)?;
    for assignment in assignments {
        BlockRepository::update_order(&mut *conn, assignment.id, assignment.block_order).await?;
    }
    let first_unlisted = ids.listed.len() as i64;
    for (offset, id) in ids.unlisted.into_iter().enumerate() {
        BlockRepository::update_order(&mut *conn, id, first_unlisted + offset as i64).await?;
    }
    Ok(())
}
