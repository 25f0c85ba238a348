use std::collections::HashMap;

use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Alias, Tag, Transfer, Use};
use crate::store::{TagStore, TriggerLookup};

#[derive(Clone, Copy, Debug)]
struct GuildSettings {
    log_uses: bool,
    log_transfers: bool,
}

impl Default for GuildSettings {
    fn default() -> Self {
        // Usage and transfer history are the point of the feature, so both
        // start enabled until a guild opts out.
        Self {
            log_uses: true,
            log_transfers: true,
        }
    }
}

#[derive(Default)]
struct GuildEntry {
    settings: GuildSettings,
    tags: HashMap<String, Tag>,
    aliases: HashMap<String, Alias>,
}

/// In-memory [`TagStore`] adapter.
///
/// Serializes every operation through a single lock, so read-modify-write
/// sequences are atomic. State dies with the process; the unit tests and
/// local development are its audience.
#[derive(Default)]
pub struct MemoryTagStore {
    guilds: RwLock<HashMap<u64, GuildEntry>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn log_uses(&self, guild: u64) -> anyhow::Result<bool> {
        let guilds = self.guilds.read().await;

        Ok(guilds
            .get(&guild)
            .map_or_else(|| GuildSettings::default().log_uses, |e| e.settings.log_uses))
    }

    async fn set_log_uses(&self, guild: u64, log: bool) -> anyhow::Result<()> {
        let mut guilds = self.guilds.write().await;
        guilds.entry(guild).or_default().settings.log_uses = log;

        Ok(())
    }

    async fn log_transfers(&self, guild: u64) -> anyhow::Result<bool> {
        let guilds = self.guilds.read().await;

        Ok(guilds.get(&guild).map_or_else(
            || GuildSettings::default().log_transfers,
            |e| e.settings.log_transfers,
        ))
    }

    async fn set_log_transfers(&self, guild: u64, log: bool) -> anyhow::Result<()> {
        let mut guilds = self.guilds.write().await;
        guilds.entry(guild).or_default().settings.log_transfers = log;

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
        let mut guilds = self.guilds.write().await;
        let entry = guilds.entry(guild).or_default();

        if entry.tags.contains_key(tag) || entry.aliases.contains_key(tag) {
            bail!("trigger `{tag}` is already in use");
        }

        let record = Tag::new(tag, creator, created, content);
        entry.tags.insert(record.tag.clone(), record.clone());

        Ok(record)
    }

    async fn get_tag(&self, guild: u64, tag: &str) -> anyhow::Result<Option<Tag>> {
        let guilds = self.guilds.read().await;

        Ok(guilds.get(&guild).and_then(|e| e.tags.get(tag)).cloned())
    }

    async fn get_tag_by_alias(&self, guild: u64, alias: &Alias) -> anyhow::Result<Option<Tag>> {
        self.get_tag(guild, &alias.tag).await
    }

    async fn get_tags_by_owner(&self, guild: u64, owner: u64) -> anyhow::Result<Vec<Tag>> {
        let guilds = self.guilds.read().await;

        let mut tags: Vec<Tag> = guilds
            .get(&guild)
            .map(|e| {
                e.tags
                    .values()
                    .filter(|tag| tag.owner == owner)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        tags.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(tags)
    }

    async fn get_tag_or_alias(&self, guild: u64, trigger: &str) -> anyhow::Result<TriggerLookup> {
        let guilds = self.guilds.read().await;
        let Some(entry) = guilds.get(&guild) else {
            return Ok(TriggerLookup::Miss);
        };

        if let Some(tag) = entry.tags.get(trigger) {
            return Ok(TriggerLookup::Tag(tag.clone()));
        }

        let Some(alias) = entry.aliases.get(trigger) else {
            return Ok(TriggerLookup::Miss);
        };

        let Some(tag) = entry.tags.get(&alias.tag) else {
            bail!("alias `{trigger}` points at a missing tag `{}`", alias.tag);
        };

        Ok(TriggerLookup::Alias {
            tag: tag.clone(),
            alias: alias.clone(),
        })
    }

    async fn add_tag_use(&self, guild: u64, tag: &Tag, usage: Use) -> anyhow::Result<()> {
        let mut guilds = self.guilds.write().await;
        let entry = guilds.entry(guild).or_default();

        let Some(stored) = entry.tags.get_mut(&tag.tag) else {
            bail!("unknown tag `{}`", tag.tag);
        };

        stored.record_use(usage);
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
        let mut guilds = self.guilds.write().await;
        let entry = guilds.entry(guild).or_default();

        if entry.tags.contains_key(alias) || entry.aliases.contains_key(alias) {
            bail!("trigger `{alias}` is already in use");
        }

        if !entry.tags.contains_key(tag) {
            bail!("unknown tag `{tag}`");
        }

        let record = Alias::new(alias, creator, created, tag);
        entry.aliases.insert(record.alias.clone(), record.clone());

        Ok(record)
    }

    async fn get_alias(&self, guild: u64, alias: &str) -> anyhow::Result<Option<Alias>> {
        let guilds = self.guilds.read().await;

        Ok(guilds
            .get(&guild)
            .and_then(|e| e.aliases.get(alias))
            .cloned())
    }

    async fn get_aliases_by_tag(&self, guild: u64, tag: &Tag) -> anyhow::Result<Vec<Alias>> {
        let guilds = self.guilds.read().await;

        let mut aliases: Vec<Alias> = guilds
            .get(&guild)
            .map(|e| {
                e.aliases
                    .values()
                    .filter(|alias| alias.tag == tag.tag)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        aliases.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(aliases)
    }

    async fn get_aliases_by_owner(&self, guild: u64, owner: u64) -> anyhow::Result<Vec<Alias>> {
        let guilds = self.guilds.read().await;

        let mut aliases: Vec<Alias> = guilds
            .get(&guild)
            .map(|e| {
                e.aliases
                    .values()
                    .filter(|alias| alias.creator == owner)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        aliases.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(aliases)
    }

    async fn add_alias_use(&self, guild: u64, alias: &Alias, usage: Use) -> anyhow::Result<()> {
        let mut guilds = self.guilds.write().await;
        let entry = guilds.entry(guild).or_default();

        let Some(stored_alias) = entry.aliases.get_mut(&alias.alias) else {
            bail!("unknown alias `{}`", alias.alias);
        };

        stored_alias.record_use(usage);
        let tag_key = stored_alias.tag.clone();

        // Alias use is also tag-level usage history.
        let Some(stored_tag) = entry.tags.get_mut(&tag_key) else {
            bail!("alias `{}` points at a missing tag `{tag_key}`", alias.alias);
        };

        stored_tag.record_use(usage);
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
        let mut guilds = self.guilds.write().await;
        let entry = guilds.entry(guild).or_default();

        let Some(stored) = entry.tags.get_mut(&tag.tag) else {
            bail!("unknown tag `{}`", tag.tag);
        };

        stored.record_transfer(Transfer::new(prior, reason, to, time));
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 1;
    const CREATOR: u64 = 100;
    const OTHER: u64 = 200;

    #[tokio::test]
    async fn created_tags_can_be_fetched_back() {
        let store = MemoryTagStore::new();

        let tag = store
            .create_tag(GUILD, "rules", CREATOR, 10, "Read the rules.")
            .await
            .unwrap();
        assert_eq!(tag.owner, CREATOR);

        let fetched = store.get_tag(GUILD, "rules").await.unwrap().unwrap();
        assert_eq!(fetched, tag);

        assert!(store.get_tag(GUILD, "missing").await.unwrap().is_none());
        assert!(store.get_tag(GUILD + 1, "rules").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tags_and_aliases_share_one_namespace() {
        let store = MemoryTagStore::new();

        store
            .create_tag(GUILD, "rules", CREATOR, 10, "Read the rules.")
            .await
            .unwrap();
        store
            .create_alias(GUILD, "r", "rules", CREATOR, 11)
            .await
            .unwrap();

        assert!(
            store
                .create_tag(GUILD, "rules", OTHER, 12, "duplicate")
                .await
                .is_err()
        );
        assert!(
            store
                .create_tag(GUILD, "r", OTHER, 12, "shadows an alias")
                .await
                .is_err()
        );
        assert!(store.create_alias(GUILD, "rules", "rules", OTHER, 12).await.is_err());
        assert!(store.create_alias(GUILD, "r", "rules", OTHER, 12).await.is_err());

        // The same triggers are free in another guild.
        store
            .create_tag(GUILD + 1, "rules", OTHER, 13, "other guild")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn aliases_require_an_existing_tag() {
        let store = MemoryTagStore::new();

        assert!(
            store
                .create_alias(GUILD, "r", "rules", CREATOR, 10)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn triggers_resolve_to_tag_alias_or_miss() {
        let store = MemoryTagStore::new();

        let tag = store
            .create_tag(GUILD, "rules", CREATOR, 10, "Read the rules.")
            .await
            .unwrap();
        let alias = store
            .create_alias(GUILD, "r", "rules", CREATOR, 11)
            .await
            .unwrap();

        assert_eq!(
            store.get_tag_or_alias(GUILD, "rules").await.unwrap(),
            TriggerLookup::Tag(tag.clone())
        );
        assert_eq!(
            store.get_tag_or_alias(GUILD, "r").await.unwrap(),
            TriggerLookup::Alias { tag, alias }
        );
        assert!(
            store
                .get_tag_or_alias(GUILD, "missing")
                .await
                .unwrap()
                .is_miss()
        );
    }

    #[tokio::test]
    async fn alias_use_is_reflected_in_tag_history() {
        let store = MemoryTagStore::new();

        let tag = store
            .create_tag(GUILD, "rules", CREATOR, 10, "Read the rules.")
            .await
            .unwrap();
        let alias = store
            .create_alias(GUILD, "r", "rules", CREATOR, 11)
            .await
            .unwrap();

        store
            .add_alias_use(GUILD, &alias, Use::new(OTHER, 20))
            .await
            .unwrap();
        store
            .add_tag_use(GUILD, &tag, Use::new(CREATOR, 30))
            .await
            .unwrap();

        let alias = store.get_alias(GUILD, "r").await.unwrap().unwrap();
        assert_eq!(alias.uses, vec![Use::new(OTHER, 20)]);

        let tag = store.get_tag(GUILD, "rules").await.unwrap().unwrap();
        assert_eq!(tag.uses, vec![Use::new(OTHER, 20), Use::new(CREATOR, 30)]);
    }

    #[tokio::test]
    async fn transfers_move_ownership_and_keep_an_audit_trail() {
        let store = MemoryTagStore::new();

        let tag = store
            .create_tag(GUILD, "rules", CREATOR, 10, "Read the rules.")
            .await
            .unwrap();

        let updated = store
            .transfer_tag(GUILD, &tag, CREATOR, OTHER, "handover", 20)
            .await
            .unwrap();
        assert_eq!(updated.owner, OTHER);
        assert_eq!(updated.effective_owner(), OTHER);
        assert_eq!(updated.transfers.len(), 1);
        assert_eq!(updated.transfers[0].prior, CREATOR);
        assert_eq!(updated.transfers[0].reason, "handover");

        let by_creator = store.get_tags_by_owner(GUILD, CREATOR).await.unwrap();
        assert!(by_creator.is_empty());

        let by_other = store.get_tags_by_owner(GUILD, OTHER).await.unwrap();
        assert_eq!(by_other.len(), 1);
        assert_eq!(by_other[0].tag, "rules");
    }

    #[tokio::test]
    async fn ownership_listings_are_ordered_by_key() {
        let store = MemoryTagStore::new();

        for key in ["zebra", "apple", "mango"] {
            store
                .create_tag(GUILD, key, CREATOR, 10, "content")
                .await
                .unwrap();
        }
        store
            .create_alias(GUILD, "z", "zebra", CREATOR, 11)
            .await
            .unwrap();
        store
            .create_alias(GUILD, "a", "apple", CREATOR, 12)
            .await
            .unwrap();

        let tags = store.get_tags_by_owner(GUILD, CREATOR).await.unwrap();
        let keys: Vec<&str> = tags.iter().map(|tag| tag.tag.as_str()).collect();
        assert_eq!(keys, ["apple", "mango", "zebra"]);

        let aliases = store.get_aliases_by_owner(GUILD, CREATOR).await.unwrap();
        let keys: Vec<&str> = aliases.iter().map(|alias| alias.alias.as_str()).collect();
        assert_eq!(keys, ["a", "z"]);
    }

    #[tokio::test]
    async fn settings_default_on_and_toggle_per_guild() {
        let store = MemoryTagStore::new();

        assert!(store.log_uses(GUILD).await.unwrap());
        assert!(store.log_transfers(GUILD).await.unwrap());

        store.set_log_uses(GUILD, false).await.unwrap();
        store.set_log_transfers(GUILD, false).await.unwrap();

        assert!(!store.log_uses(GUILD).await.unwrap());
        assert!(!store.log_transfers(GUILD).await.unwrap());

        // Another guild keeps the defaults.
        assert!(store.log_uses(GUILD + 1).await.unwrap());
    }
}
