//! `shard.realm.num` entity identifiers

use std::fmt;
use std::str::FromStr;

use hiero_proto as proto;

use crate::PrimitiveError;

fn parse_triple(s: &str) -> Result<(u64, u64, u64), PrimitiveError> {
    let parts: Vec<&str> = s.trim().split('.').collect();
    let parse = |p: &str| {
        p.parse::<u64>()
            .map_err(|_| PrimitiveError::InvalidEntityId(s.to_string()))
    };
    match parts.as_slice() {
        [num] => Ok((0, 0, parse(num)?)),
        [shard, realm, num] => Ok((parse(shard)?, parse(realm)?, parse(num)?)),
        _ => Err(PrimitiveError::InvalidEntityId(s.to_string())),
    }
}

fn to_u64(value: i64) -> Result<u64, PrimitiveError> {
    u64::try_from(value).map_err(|_| PrimitiveError::InvalidEntityId(value.to_string()))
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name {
            /// Shard number
            pub shard: u64,
            /// Realm number
            pub realm: u64,
            /// Entity number
            pub num: u64,
        }

        impl $name {
            /// Create an id from its three components
            pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self { shard, realm, num }
            }

            /// Create an id in shard 0, realm 0
            pub const fn from_num(num: u64) -> Self {
                Self::new(0, 0, num)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (shard, realm, num) = parse_triple(s)?;
                Ok(Self::new(shard, realm, num))
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

entity_id!(
    /// An account on the ledger
    AccountId
);
entity_id!(
    /// A consensus topic
    TopicId
);
entity_id!(
    /// A file
    FileId
);

impl From<AccountId> for proto::AccountId {
    fn from(id: AccountId) -> Self {
        proto::AccountId {
            shard_num: id.shard as i64,
            realm_num: id.realm as i64,
            account: Some(proto::account_id::Account::AccountNum(id.num as i64)),
        }
    }
}

impl TryFrom<proto::AccountId> for AccountId {
    type Error = PrimitiveError;

    fn try_from(id: proto::AccountId) -> Result<Self, Self::Error> {
        match id.account {
            Some(proto::account_id::Account::AccountNum(num)) => Ok(AccountId::new(
                to_u64(id.shard_num)?,
                to_u64(id.realm_num)?,
                to_u64(num)?,
            )),
            Some(proto::account_id::Account::Alias(_)) => Err(PrimitiveError::InvalidEntityId(
                "account aliases are not supported".to_string(),
            )),
            None => Err(PrimitiveError::MissingField("AccountID.account")),
        }
    }
}

impl From<TopicId> for proto::TopicId {
    fn from(id: TopicId) -> Self {
        proto::TopicId {
            shard_num: id.shard as i64,
            realm_num: id.realm as i64,
            topic_num: id.num as i64,
        }
    }
}

impl TryFrom<proto::TopicId> for TopicId {
    type Error = PrimitiveError;

    fn try_from(id: proto::TopicId) -> Result<Self, Self::Error> {
        Ok(TopicId::new(to_u64(id.shard_num)?, to_u64(id.realm_num)?, to_u64(id.topic_num)?))
    }
}

impl From<FileId> for proto::FileId {
    fn from(id: FileId) -> Self {
        proto::FileId {
            shard_num: id.shard as i64,
            realm_num: id.realm as i64,
            file_num: id.num as i64,
        }
    }
}

impl TryFrom<proto::FileId> for FileId {
    type Error = PrimitiveError;

    fn try_from(id: proto::FileId) -> Result<Self, Self::Error> {
        Ok(FileId::new(to_u64(id.shard_num)?, to_u64(id.realm_num)?, to_u64(id.file_num)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: AccountId = "0.0.1001".parse().unwrap();
        assert_eq!(id, AccountId::new(0, 0, 1001));
        assert_eq!(id.to_string(), "0.0.1001");
        assert_eq!(format!("{:?}", id), "AccountId(0.0.1001)");
    }

    #[test]
    fn test_parse_bare_number() {
        let id: TopicId = "42".parse().unwrap();
        assert_eq!(id, TopicId::from_num(42));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("0.0".parse::<AccountId>().is_err());
        assert!("a.b.c".parse::<FileId>().is_err());
        assert!("0.0.-1".parse::<AccountId>().is_err());
        assert!("".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_proto_conversion() {
        let id = AccountId::new(1, 2, 3);
        let proto: proto::AccountId = id.into();
        assert_eq!(AccountId::try_from(proto).unwrap(), id);

        let topic = TopicId::new(0, 0, 9);
        assert_eq!(TopicId::try_from(proto::TopicId::from(topic)).unwrap(), topic);
    }

    #[test]
    fn test_proto_negative_rejected() {
        let proto = proto::FileId { shard_num: -1, realm_num: 0, file_num: 1 };
        assert!(FileId::try_from(proto).is_err());
    }

    #[test]
    fn test_proto_alias_rejected() {
        let proto = proto::AccountId {
            shard_num: 0,
            realm_num: 0,
            account: Some(proto::account_id::Account::Alias(vec![1, 2])),
        };
        assert!(AccountId::try_from(proto).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_as_string() {
        let id = AccountId::new(0, 0, 3);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0.0.3\"");
        let back: AccountId = serde_json::from_str("\"0.0.3\"").unwrap();
        assert_eq!(back, id);
    }
}
