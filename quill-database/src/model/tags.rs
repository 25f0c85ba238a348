//! Entity records for the tags feature.
//!
//! All four entities are immutable value records apart from the explicit
//! `record_*` mutations, and every field set is closed: rehydrating a record
//! with a missing, extra, or mistyped field is a hard failure surfaced at the
//! storage boundary rather than a silently defaulted document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ownership-change audit record on a tag. Append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transfer {
    pub prior: u64,
    pub reason: String,
    pub to: u64,
    pub time: u64,
}

impl Transfer {
    /// Record an ownership change happening now, in a command context.
    pub fn new(prior: u64, reason: impl Into<String>, to: u64, time: u64) -> Self {
        Self {
            prior,
            reason: reason.into(),
            to,
            time,
        }
    }

    /// Rehydrate a transfer from a persisted key-value record.
    pub fn from_record(record: Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(record)?)
    }

    /// Serialize into a key-value record suitable for persistence.
    pub fn to_record(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A usage audit record on a tag or alias. Append-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Use {
    pub user: u64,
    pub time: u64,
}

impl Use {
    /// Record an invocation happening now, in a command context.
    pub fn new(user: u64, time: u64) -> Self {
        Self { user, time }
    }

    /// Rehydrate a use from a persisted key-value record.
    pub fn from_record(record: Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(record)?)
    }

    /// Serialize into a key-value record suitable for persistence.
    pub fn to_record(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A named, owned, persistent text snippet triggered by command.
///
/// Invariant: `owner` always equals the `to` field of the most recent
/// transfer, or `creator` when the transfer list is empty. The only mutation
/// that touches `owner` is [`Tag::record_transfer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tag {
    pub tag: String,
    pub creator: u64,
    pub owner: u64,
    pub created: u64,
    pub content: String,
    pub transfers: Vec<Transfer>,
    pub uses: Vec<Use>,
}

impl Tag {
    /// Build a freshly created tag in a command context.
    ///
    /// The creator starts out as the owner and both history lists are empty.
    pub fn new(
        tag: impl Into<String>,
        creator: u64,
        created: u64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            creator,
            owner: creator,
            created,
            content: content.into(),
            transfers: Vec::new(),
            uses: Vec::new(),
        }
    }

    /// Rehydrate a tag from a persisted key-value record.
    pub fn from_record(record: Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(record)?)
    }

    /// Serialize into a key-value record suitable for persistence.
    pub fn to_record(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The owner implied by the transfer history.
    pub fn effective_owner(&self) -> u64 {
        self.transfers
            .last()
            .map_or(self.creator, |transfer| transfer.to)
    }

    /// Append an ownership change and move the tag to its new owner.
    pub fn record_transfer(&mut self, transfer: Transfer) {
        self.owner = transfer.to;
        self.transfers.push(transfer);
    }

    /// Append a usage entry.
    pub fn record_use(&mut self, usage: Use) {
        self.uses.push(usage);
    }
}

/// A secondary trigger resolving to exactly one tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alias {
    pub alias: String,
    pub creator: u64,
    pub created: u64,
    pub tag: String,
    pub uses: Vec<Use>,
}

impl Alias {
    /// Build a freshly created alias in a command context.
    pub fn new(
        alias: impl Into<String>,
        creator: u64,
        created: u64,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            creator,
            created,
            tag: tag.into(),
            uses: Vec::new(),
        }
    }

    /// Rehydrate an alias from a persisted key-value record.
    pub fn from_record(record: Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(record)?)
    }

    /// Serialize into a key-value record suitable for persistence.
    pub fn to_record(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Append a usage entry.
    pub fn record_use(&mut self, usage: Use) {
        self.uses.push(usage);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fresh_tag_is_owned_by_its_creator() {
        let tag = Tag::new("rules", 100, 1_700_000_000, "Read the rules.");

        assert_eq!(tag.owner, 100);
        assert_eq!(tag.effective_owner(), 100);
        assert!(tag.transfers.is_empty());
        assert!(tag.uses.is_empty());
    }

    #[test]
    fn effective_owner_follows_the_last_transfer() {
        let mut tag = Tag::new("rules", 100, 1_700_000_000, "Read the rules.");

        tag.record_transfer(Transfer::new(100, "handover", 200, 1_700_000_100));
        assert_eq!(tag.owner, 200);
        assert_eq!(tag.effective_owner(), 200);

        tag.record_transfer(Transfer::new(200, "handover again", 300, 1_700_000_200));
        assert_eq!(tag.owner, 300);
        assert_eq!(tag.effective_owner(), 300);
        assert_eq!(tag.transfers.len(), 2);
    }

    #[test]
    fn tag_round_trips_through_its_record_form() {
        let mut tag = Tag::new("rules", 100, 1_700_000_000, "Read the rules.");
        tag.record_use(Use::new(42, 1_700_000_050));
        tag.record_transfer(Transfer::new(100, "handover", 200, 1_700_000_100));

        let record = tag.to_record().unwrap();
        let restored = Tag::from_record(record).unwrap();

        assert_eq!(restored, tag);
    }

    #[test]
    fn rehydration_rejects_a_missing_field() {
        let record = json!({
            "user": 42,
        });

        assert!(Use::from_record(record).is_err());
    }

    #[test]
    fn rehydration_rejects_an_unknown_field() {
        let record = json!({
            "user": 42,
            "time": 1_700_000_000_u64,
            "channel": 7,
        });

        assert!(Use::from_record(record).is_err());
    }

    #[test]
    fn rehydration_rejects_a_mistyped_field() {
        let record = json!({
            "alias": "r",
            "creator": "not-a-user-id",
            "created": 1_700_000_000_u64,
            "tag": "rules",
            "uses": [],
        });

        assert!(Alias::from_record(record).is_err());
    }

    #[test]
    fn alias_usage_history_is_insertion_ordered() {
        let mut alias = Alias::new("r", 100, 1_700_000_000, "rules");
        alias.record_use(Use::new(1, 10));
        alias.record_use(Use::new(2, 20));

        assert_eq!(alias.uses, vec![Use::new(1, 10), Use::new(2, 20)]);
    }
}
