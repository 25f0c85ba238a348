use anyhow::bail;
use async_trait::async_trait;

use crate::Database;
use crate::model::{Alias, Tag, Transfer, Use};
use crate::store::{TagStore, TriggerLookup};

/// Postgres-backed [`TagStore`] adapter.
///
/// Entities live as JSONB documents keyed by guild id plus trigger string,
/// so the wire shape is exactly the entity record form. Read-modify-write
/// sequences run inside a transaction with the affected rows locked.
#[derive(Clone)]
pub struct PgTagStore {
    db: Database,
}

impl PgTagStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn trigger_occupied(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        guild: u64,
        trigger: &str,
    ) -> anyhow::Result<bool> {
        let occupied: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tags WHERE guild_id = $1 AND tag = $2)
                 OR EXISTS (SELECT 1 FROM tag_aliases WHERE guild_id = $1 AND alias = $2)",
        )
        .bind(guild as i64)
        .bind(trigger)
        .fetch_one(&mut **tx)
        .await?;

        Ok(occupied)
    }
}

#[async_trait]
impl TagStore for PgTagStore {
    async fn log_uses(&self, guild: u64) -> anyhow::Result<bool> {
        let log: Option<bool> =
            sqlx::query_scalar("SELECT log_uses FROM tag_settings WHERE guild_id = $1")
                .bind(guild as i64)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(log.unwrap_or(true))
    }

    async fn set_log_uses(&self, guild: u64, log: bool) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO tag_settings (guild_id, log_uses) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET log_uses = EXCLUDED.log_uses",
        )
        .bind(guild as i64)
        .bind(log)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn log_transfers(&self, guild: u64) -> anyhow::Result<bool> {
        let log: Option<bool> =
            sqlx::query_scalar("SELECT log_transfers FROM tag_settings WHERE guild_id = $1")
                .bind(guild as i64)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(log.unwrap_or(true))
    }

    async fn set_log_transfers(&self, guild: u64, log: bool) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO tag_settings (guild_id, log_transfers) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET log_transfers = EXCLUDED.log_transfers",
        )
        .bind(guild as i64)
        .bind(log)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn create_tag(
        &self,
        guild: u64,
        tag: &str,
        creator: u64,
        created: u64,
        content: &str,
    ) -> anyhow::Result<Tag> {
        let mut tx = self.db.pool().begin().await?;

        if self.trigger_occupied(&mut tx, guild, tag).await? {
            bail!("trigger `{tag}` is already in use");
        }

        let record = Tag::new(tag, creator, created, content);
        sqlx::query("INSERT INTO tags (guild_id, tag, doc) VALUES ($1, $2, $3)")
            .bind(guild as i64)
            .bind(&record.tag)
            .bind(record.to_record()?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn get_tag(&self, guild: u64, tag: &str) -> anyhow::Result<Option<Tag>> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM tags WHERE guild_id = $1 AND tag = $2")
                .bind(guild as i64)
                .bind(tag)
                .fetch_optional(self.db.pool())
                .await?;

        doc.map(Tag::from_record).transpose()
    }

    async fn get_tag_by_alias(&self, guild: u64, alias: &Alias) -> anyhow::Result<Option<Tag>> {
        self.get_tag(guild, &alias.tag).await
    }

    async fn get_tags_by_owner(&self, guild: u64, owner: u64) -> anyhow::Result<Vec<Tag>> {
        let docs: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT doc FROM tags
             WHERE guild_id = $1 AND (doc->>'owner')::BIGINT = $2
             ORDER BY tag",
        )
        .bind(guild as i64)
        .bind(owner as i64)
        .fetch_all(self.db.pool())
        .await?;

        docs.into_iter().map(Tag::from_record).collect()
    }

    async fn get_tag_or_alias(&self, guild: u64, trigger: &str) -> anyhow::Result<TriggerLookup> {
        if let Some(tag) = self.get_tag(guild, trigger).await? {
            return Ok(TriggerLookup::Tag(tag));
        }

        let Some(alias) = self.get_alias(guild, trigger).await? else {
            return Ok(TriggerLookup::Miss);
        };

        let Some(tag) = self.get_tag(guild, &alias.tag).await? else {
            bail!("alias `{trigger}` points at a missing tag `{}`", alias.tag);
        };

        Ok(TriggerLookup::Alias { tag, alias })
    }

    async fn add_tag_use(&self, guild: u64, tag: &Tag, usage: Use) -> anyhow::Result<()> {
        let mut tx = self.db.pool().begin().await?;

        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM tags WHERE guild_id = $1 AND tag = $2 FOR UPDATE")
                .bind(guild as i64)
                .bind(&tag.tag)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(doc) = doc else {
            bail!("unknown tag `{}`", tag.tag);
        };

        let mut record = Tag::from_record(doc)?;
        record.record_use(usage);

        sqlx::query("UPDATE tags SET doc = $3 WHERE guild_id = $1 AND tag = $2")
            .bind(guild as i64)
            .bind(&record.tag)
            .bind(record.to_record()?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn create_alias(
        &self,
        guild: u64,
        alias: &str,
        tag: &str,
        creator: u64,
        created: u64,
    ) -> anyhow::Result<Alias> {
        let mut tx = self.db.pool().begin().await?;

        if self.trigger_occupied(&mut tx, guild, alias).await? {
            bail!("trigger `{alias}` is already in use");
        }

        let target_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tags WHERE guild_id = $1 AND tag = $2)")
                .bind(guild as i64)
                .bind(tag)
                .fetch_one(&mut *tx)
                .await?;
        if !target_exists {
            bail!("unknown tag `{tag}`");
        }

        let record = Alias::new(alias, creator, created, tag);
        sqlx::query("INSERT INTO tag_aliases (guild_id, alias, tag, doc) VALUES ($1, $2, $3, $4)")
            .bind(guild as i64)
            .bind(&record.alias)
            .bind(&record.tag)
            .bind(record.to_record()?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn get_alias(&self, guild: u64, alias: &str) -> anyhow::Result<Option<Alias>> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM tag_aliases WHERE guild_id = $1 AND alias = $2")
                .bind(guild as i64)
                .bind(alias)
                .fetch_optional(self.db.pool())
                .await?;

        doc.map(Alias::from_record).transpose()
    }

    async fn get_aliases_by_tag(&self, guild: u64, tag: &Tag) -> anyhow::Result<Vec<Alias>> {
        let docs: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT doc FROM tag_aliases WHERE guild_id = $1 AND tag = $2 ORDER BY alias",
        )
        .bind(guild as i64)
        .bind(&tag.tag)
        .fetch_all(self.db.pool())
        .await?;

        docs.into_iter().map(Alias::from_record).collect()
    }

    async fn get_aliases_by_owner(&self, guild: u64, owner: u64) -> anyhow::Result<Vec<Alias>> {
        let docs: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT doc FROM tag_aliases
             WHERE guild_id = $1 AND (doc->>'creator')::BIGINT = $2
             ORDER BY alias",
        )
        .bind(guild as i64)
        .bind(owner as i64)
        .fetch_all(self.db.pool())
        .await?;

        docs.into_iter().map(Alias::from_record).collect()
    }

    async fn add_alias_use(&self, guild: u64, alias: &Alias, usage: Use) -> anyhow::Result<()> {
        let mut tx = self.db.pool().begin().await?;

        // Lock order is alias then tag, everywhere.
        let doc: Option<serde_json::Value> = sqlx::query_scalar(
            "SELECT doc FROM tag_aliases WHERE guild_id = $1 AND alias = $2 FOR UPDATE",
        )
        .bind(guild as i64)
        .bind(&alias.alias)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(doc) = doc else {
            bail!("unknown alias `{}`", alias.alias);
        };

        let mut alias_record = Alias::from_record(doc)?;
        alias_record.record_use(usage);

        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM tags WHERE guild_id = $1 AND tag = $2 FOR UPDATE")
                .bind(guild as i64)
                .bind(&alias_record.tag)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(doc) = doc else {
            bail!(
                "alias `{}` points at a missing tag `{}`",
                alias_record.alias,
                alias_record.tag
            );
        };

        // Alias use is also tag-level usage history.
        let mut tag_record = Tag::from_record(doc)?;
        tag_record.record_use(usage);

        sqlx::query("UPDATE tag_aliases SET doc = $3 WHERE guild_id = $1 AND alias = $2")
            .bind(guild as i64)
            .bind(&alias_record.alias)
            .bind(alias_record.to_record()?)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE tags SET doc = $3 WHERE guild_id = $1 AND tag = $2")
            .bind(guild as i64)
            .bind(&tag_record.tag)
            .bind(tag_record.to_record()?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn transfer_tag(
        &self,
        guild: u64,
        tag: &Tag,
        prior: u64,
        to: u64,
        reason: &str,
        time: u64,
    ) -> anyhow::Result<Tag> {
        let mut tx = self.db.pool().begin().await?;

        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM tags WHERE guild_id = $1 AND tag = $2 FOR UPDATE")
                .bind(guild as i64)
                .bind(&tag.tag)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(doc) = doc else {
            bail!("unknown tag `{}`", tag.tag);
        };

        let mut record = Tag::from_record(doc)?;
        record.record_transfer(Transfer::new(prior, reason, to, time));

        sqlx::query("UPDATE tags SET doc = $3 WHERE guild_id = $1 AND tag = $2")
            .bind(guild as i64)
            .bind(&record.tag)
            .bind(record.to_record()?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }
}
