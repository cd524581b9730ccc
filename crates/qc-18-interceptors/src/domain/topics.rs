//! Gossip topic families.
//!
//! Topic strings are the wire-level identifiers; internally each topic is a
//! `TopicFamily` plus a communication identifier suffix.

use shared_types::{communication_identifier_between, ShardId};
use std::fmt;

/// Closed set of intercepted topic families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopicFamily {
    MetachainBlocks,
    ShardBlocks,
    Transactions,
    UnsignedTransactions,
    RewardTransactions,
    MiniBlocks,
    AccountTrieNodes,
    ValidatorTrieNodes,
}

impl TopicFamily {
    pub const ALL: [TopicFamily; 8] = [
        TopicFamily::MetachainBlocks,
        TopicFamily::ShardBlocks,
        TopicFamily::Transactions,
        TopicFamily::UnsignedTransactions,
        TopicFamily::RewardTransactions,
        TopicFamily::MiniBlocks,
        TopicFamily::AccountTrieNodes,
        TopicFamily::ValidatorTrieNodes,
    ];

    pub fn base_name(self) -> &'static str {
        match self {
            TopicFamily::MetachainBlocks => "metachainBlocks",
            TopicFamily::ShardBlocks => "shardBlocks",
            TopicFamily::Transactions => "transactions",
            TopicFamily::UnsignedTransactions => "unsignedTransactions",
            TopicFamily::RewardTransactions => "rewardsTransactions",
            TopicFamily::MiniBlocks => "txBlockBodies",
            TopicFamily::AccountTrieNodes => "accountTrieNodes",
            TopicFamily::ValidatorTrieNodes => "validatorTrieNodes",
        }
    }

    /// Topic carrying this family between shards `a` and `b`.
    pub fn topic_between(self, a: ShardId, b: ShardId) -> String {
        format!("{}{}", self.base_name(), communication_identifier_between(a, b))
    }

    /// Topic for this family with an already computed identifier suffix.
    pub fn topic_with(self, communication_identifier: &str) -> String {
        format!("{}{}", self.base_name(), communication_identifier)
    }

    /// True for families whose messages carry a `Batch` of objects.
    pub fn is_batched(self) -> bool {
        !matches!(self, TopicFamily::MetachainBlocks | TopicFamily::ShardBlocks)
    }

    /// Maps a topic string back to its family.
    ///
    /// The base name must be followed by nothing or by a `_` suffix.
    pub fn parse(topic: &str) -> Option<TopicFamily> {
        Self::ALL.into_iter().find(|family| {
            topic
                .strip_prefix(family.base_name())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('_'))
        })
    }
}

impl fmt::Display for TopicFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::METACHAIN_SHARD_ID;

    #[test]
    fn test_topic_between() {
        assert_eq!(
            TopicFamily::Transactions.topic_between(1, 0),
            "transactions_0_1"
        );
        assert_eq!(
            TopicFamily::ShardBlocks.topic_between(2, METACHAIN_SHARD_ID),
            "shardBlocks_2_META"
        );
        assert_eq!(
            TopicFamily::MiniBlocks.topic_between(METACHAIN_SHARD_ID, METACHAIN_SHARD_ID),
            "txBlockBodies_META"
        );
    }

    #[test]
    fn test_parse_roundtrips_every_family() {
        for family in TopicFamily::ALL {
            assert_eq!(TopicFamily::parse(family.base_name()), Some(family));
            assert_eq!(TopicFamily::parse(&family.topic_between(0, 1)), Some(family));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_glued_names() {
        assert_eq!(TopicFamily::parse("heartbeat"), None);
        assert_eq!(TopicFamily::parse("transactionsX"), None);
        assert_eq!(TopicFamily::parse(""), None);
    }

    #[test]
    fn test_unsigned_transactions_not_parsed_as_transactions() {
        assert_eq!(
            TopicFamily::parse("unsignedTransactions_0"),
            Some(TopicFamily::UnsignedTransactions)
        );
    }
}
