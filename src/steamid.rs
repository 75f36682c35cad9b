//! Conversions between the four Steam ID formats.
//!
//! The 64-bit form is the primary key used for API calls. The other three
//! forms are related to it by fixed arithmetic:
//!
//! - `STEAM_0:0:86173181` (legacy)
//! - `76561198132612090` (64-bit)
//! - `172346362` (32-bit account)
//! - `[U:1:172346362]` (steam3)

use crate::error::ParseSteamIdError;
use crate::types::AccountId;
use std::fmt;
use std::str::FromStr;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The offset between the 32-bit account number and the 64-bit ID of an
/// individual account in the public universe.
const ACCOUNT_ID_OFFSET: u64 = 76561197960265728;

/// A user's Steam ID, stored in the canonical 64-bit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    /// Creates a [`SteamId`] from its 64-bit form.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Creates a [`SteamId`] from the 32-bit account number used by some
    /// endpoints, e.g. the `accountid_from` field of chat poll messages.
    pub fn from_account_id(account_id: AccountId) -> Self {
        Self(account_id as u64 + ACCOUNT_ID_OFFSET)
    }

    /// The 32-bit account number. The auth server bit is its lowest bit.
    pub fn account_id(&self) -> AccountId {
        (self.0 & 0xFFFF_FFFF) as AccountId
    }

    /// Parses a legacy `STEAM_0:<bit>:<number>` ID.
    pub fn from_steam2(steam2: &str) -> Result<Self, ParseSteamIdError> {
        let mut parts = steam2.splitn(3, ':');
        match parts.next() {
            // Steam renders the public universe as both STEAM_0 and STEAM_1
            Some("STEAM_0" | "STEAM_1") => {},
            _ => return Err(ParseSteamIdError::Malformed("expected STEAM_0 prefix")),
        }
        let auth_server = match parts.next() {
            Some("0") => 0u64,
            Some("1") => 1u64,
            Some(_) => return Err(ParseSteamIdError::Malformed("auth server bit must be 0 or 1")),
            None => return Err(ParseSteamIdError::Malformed("missing auth server segment")),
        };
        let number = parts.next()
            .ok_or(ParseSteamIdError::Malformed("missing account number segment"))?
            .parse::<u32>()?;

        Ok(Self((number as u64) * 2 + ACCOUNT_ID_OFFSET + auth_server))
    }

    /// The legacy `STEAM_0:<bit>:<number>` form.
    pub fn steam2(&self) -> String {
        let account_id = self.account_id();

        format!("STEAM_0:{}:{}", account_id & 1, account_id >> 1)
    }

    /// Parses a `[U:1:<account number>]` ID.
    ///
    /// The bracketed number is the full 32-bit account number with the auth
    /// server bit as its lowest bit, not the halved number found in the
    /// legacy form.
    pub fn from_steam3(steam3: &str) -> Result<Self, ParseSteamIdError> {
        let inner = steam3
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(steam3);
        let mut parts = inner.splitn(3, ':');

        if parts.next() != Some("U") {
            return Err(ParseSteamIdError::Malformed("expected a U account type"));
        }

        if parts.next() != Some("1") {
            return Err(ParseSteamIdError::Malformed("expected universe 1"));
        }

        let account_id = parts.next()
            .ok_or(ParseSteamIdError::Malformed("missing account number segment"))?
            .parse::<u32>()?;

        Ok(Self::from_account_id(account_id))
    }

    /// The `[U:1:<account number>]` form.
    pub fn steam3(&self) -> String {
        format!("[U:1:{}]", self.account_id())
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SteamId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<SteamId> for u64 {
    fn from(steamid: SteamId) -> Self {
        steamid.0
    }
}

impl FromStr for SteamId {
    type Err = ParseSteamIdError;

    /// Parses a Steam ID from any of its four renderings. Bare numbers below
    /// the 64-bit offset are taken as 32-bit account numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseSteamIdError::Malformed("empty string"));
        }

        if s.starts_with("STEAM_") {
            return Self::from_steam2(s);
        }

        if s.starts_with('[') || s.starts_with("U:") {
            return Self::from_steam3(s);
        }

        let number = s.parse::<u64>()?;

        if number >= ACCOUNT_ID_OFFSET {
            Ok(Self(number))
        } else if let Ok(account_id) = AccountId::try_from(number) {
            Ok(Self::from_account_id(account_id))
        } else {
            Err(ParseSteamIdError::Malformed("number is not a valid ID in any format"))
        }
    }
}

impl Serialize for SteamId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    /// Deserializes from either a number or a string, since Steam is not
    /// consistent about which one it sends.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SteamIdVisitor;

        impl<'de> Visitor<'de> for SteamIdVisitor {
            type Value = SteamId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a Steam ID as a number or string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(SteamId(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(SteamIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_steam2_to_64() {
        let steamid = SteamId::from_steam2("STEAM_0:0:86173181").unwrap();

        assert_eq!(u64::from(steamid), 76561198132612090);
    }

    #[test]
    fn converts_64_to_steam2() {
        assert_eq!(SteamId::new(76561198132612090).steam2(), "STEAM_0:0:86173181");
    }

    #[test]
    fn converts_64_to_steam3() {
        assert_eq!(SteamId::new(76561198132612090).steam3(), "[U:1:172346362]");
    }

    #[test]
    fn converts_account_id_to_64() {
        assert_eq!(
            SteamId::from_account_id(172346362),
            SteamId::new(76561198132612090),
        );
    }

    #[test]
    fn extracts_account_id() {
        assert_eq!(SteamId::new(76561198132612090).account_id(), 172346362);
    }

    #[test]
    fn steam3_keeps_auth_server_bit() {
        // a server-type (odd) account number; the bracketed number must be
        // halved when converting to the legacy form
        let steamid = SteamId::from_steam3("[U:1:5]").unwrap();

        assert_eq!(u64::from(steamid), 5 + 76561197960265728);
        assert_eq!(steamid.steam2(), "STEAM_0:1:2");
        assert_eq!(steamid.steam3(), "[U:1:5]");
    }

    #[test]
    fn odd_steam2_round_trips() {
        let steamid = SteamId::from_steam2("STEAM_0:1:2").unwrap();

        assert_eq!(steamid.account_id(), 5);
        assert_eq!(steamid.steam2(), "STEAM_0:1:2");
    }

    #[test]
    fn round_trips_through_all_formats() {
        let original = SteamId::new(76561198132612090);
        let through_steam2 = SteamId::from_steam2(&original.steam2()).unwrap();
        let through_steam3 = SteamId::from_steam3(&original.steam3()).unwrap();
        let through_account_id = SteamId::from_account_id(original.account_id());

        assert_eq!(through_steam2, original);
        assert_eq!(through_steam3, original);
        assert_eq!(through_account_id, original);
    }

    #[test]
    fn missing_segment_is_an_error() {
        assert!(SteamId::from_steam2("STEAM_0:0").is_err());
    }

    #[test]
    fn non_numeric_segment_is_an_error() {
        assert!(SteamId::from_steam2("STEAM_0:0:abc").is_err());
        assert!(SteamId::from_steam3("[U:1:abc]").is_err());
    }

    #[test]
    fn bad_auth_server_bit_is_an_error() {
        assert!(SteamId::from_steam2("STEAM_0:2:86173181").is_err());
    }

    #[test]
    fn wrong_universe_is_an_error() {
        assert!(SteamId::from_steam3("[U:2:172346362]").is_err());
        assert!(SteamId::from_steam3("[G:1:172346362]").is_err());
    }

    #[test]
    fn parses_from_any_format() {
        let expected = SteamId::new(76561198132612090);

        assert_eq!("STEAM_0:0:86173181".parse::<SteamId>().unwrap(), expected);
        assert_eq!("[U:1:172346362]".parse::<SteamId>().unwrap(), expected);
        assert_eq!("76561198132612090".parse::<SteamId>().unwrap(), expected);
        assert_eq!("172346362".parse::<SteamId>().unwrap(), expected);
        assert!("".parse::<SteamId>().is_err());
    }

    #[test]
    fn deserializes_from_number_or_string() {
        let from_number: SteamId = serde_json::from_str("76561198132612090").unwrap();
        let from_string: SteamId = serde_json::from_str(r#""76561198132612090""#).unwrap();

        assert_eq!(from_number, from_string);
    }
}
