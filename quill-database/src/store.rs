use async_trait::async_trait;

use crate::model::{Alias, Tag, Use};

/// Result of resolving an arbitrary trigger string within a guild.
///
/// Tag and alias keys share one namespace, so a trigger resolves to at most
/// one of the two.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerLookup {
    /// The trigger is a tag key.
    Tag(Tag),
    /// The trigger is an alias key; carries the alias and its resolved tag.
    Alias { tag: Tag, alias: Alias },
    /// The trigger is unknown in this guild.
    Miss,
}

impl TriggerLookup {
    /// Whether the trigger resolved to anything.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// Storage capability backing the tags feature.
///
/// Every operation is scoped to a guild, and histories are append-only: no
/// operation here deletes or rewrites a transfer or use entry. Implementations
/// own their synchronization; callers never see partially applied writes.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Returns whether to log tag/alias use in the guild.
    async fn log_uses(&self, guild: u64) -> anyhow::Result<bool>;

    /// Sets whether to log tag/alias use in the guild.
    async fn set_log_uses(&self, guild: u64, log: bool) -> anyhow::Result<()>;

    /// Returns whether to show transfer history in the guild.
    async fn log_transfers(&self, guild: u64) -> anyhow::Result<bool>;

    /// Sets whether to show transfer history in the guild.
    async fn set_log_transfers(&self, guild: u64, log: bool) -> anyhow::Result<()>;

    /// Creates, saves, and returns a new tag.
    ///
    /// Fails when the trigger is already a tag or alias key in the guild.
    async fn create_tag(
        &self,
        guild: u64,
        tag: &str,
        creator: u64,
        created: u64,
        content: &str,
    ) -> anyhow::Result<Tag>;

    /// Returns the tag, if any, for the given key.
    async fn get_tag(&self, guild: u64, tag: &str) -> anyhow::Result<Option<Tag>>;

    /// Returns the associated tag for the given alias.
    async fn get_tag_by_alias(&self, guild: u64, alias: &Alias) -> anyhow::Result<Option<Tag>>;

    /// Returns the tags owned by the provided owner, ordered by key.
    async fn get_tags_by_owner(&self, guild: u64, owner: u64) -> anyhow::Result<Vec<Tag>>;

    /// Resolves a trigger to a tag, an alias plus its tag, or a miss.
    async fn get_tag_or_alias(&self, guild: u64, trigger: &str) -> anyhow::Result<TriggerLookup>;

    /// Appends and saves a usage entry for the specified tag.
    async fn add_tag_use(&self, guild: u64, tag: &Tag, usage: Use) -> anyhow::Result<()>;

    /// Creates, saves, and returns a new alias for an existing tag.
    ///
    /// Fails when the alias key is already a tag or alias key in the guild,
    /// or when the target tag does not exist.
    async fn create_alias(
        &self,
        guild: u64,
        alias: &str,
        tag: &str,
        creator: u64,
        created: u64,
    ) -> anyhow::Result<Alias>;

    /// Returns the alias, if any, for the given key.
    async fn get_alias(&self, guild: u64, alias: &str) -> anyhow::Result<Option<Alias>>;

    /// Returns the aliases pointing at the given tag, ordered by key.
    async fn get_aliases_by_tag(&self, guild: u64, tag: &Tag) -> anyhow::Result<Vec<Alias>>;

    /// Returns the aliases created by the provided owner, ordered by key.
    async fn get_aliases_by_owner(&self, guild: u64, owner: u64) -> anyhow::Result<Vec<Alias>>;

    /// Appends and saves a usage entry for the specified alias and its
    /// associated tag.
    async fn add_alias_use(&self, guild: u64, alias: &Alias, usage: Use) -> anyhow::Result<()>;

    /// Appends an ownership transfer to the tag and saves the new owner.
    ///
    /// Returns the updated tag.
    async fn transfer_tag(
        &self,
        guild: u64,
        tag: &Tag,
        prior: u64,
        to: u64,
        reason: &str,
        time: u64,
    ) -> anyhow::Result<Tag>;
}
