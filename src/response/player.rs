use crate::steamid::SteamId;
use crate::types::GroupId;
use serde::Deserialize;

/// General profile information for a user, as returned by
/// `GetPlayerSummaries`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSummary {
    pub steamid: SteamId,
    #[serde(rename = "personaname")]
    pub display_name: String,
    #[serde(rename = "profileurl")]
    pub profile_url: String,
    #[serde(rename = "avatar")]
    pub avatar_small_url: String,
    #[serde(rename = "avatarmedium")]
    pub avatar_medium_url: String,
    #[serde(rename = "avatarfull")]
    pub avatar_full_url: String,
    /// 0 offline, 1 online, 2 busy, 3 away, 4 snooze, 5 looking to trade,
    /// 6 looking to play.
    #[serde(rename = "personastate", default)]
    pub state: u8,
    #[serde(rename = "communityvisibilitystate", default)]
    visibility_state: u8,
    #[serde(rename = "profilestate", default)]
    profile_state: u8,
    #[serde(rename = "lastlogoff", default)]
    pub last_logoff: u64,
    #[serde(rename = "realname", default)]
    pub real_name: String,
    #[serde(rename = "primaryclanid", default)]
    primary_clanid: Option<String>,
    #[serde(rename = "timecreated", default)]
    pub time_created: u64,
    #[serde(rename = "gameextrainfo", default)]
    pub currently_playing: String,
    #[serde(rename = "gameserverip", default)]
    pub server_ip: String,
    #[serde(rename = "loccountrycode", default)]
    pub country_code: String,
}

impl PlayerSummary {
    /// Whether the profile is publicly visible.
    pub fn is_public(&self) -> bool {
        self.visibility_state == 3
    }

    /// Whether the user has set up their community profile.
    pub fn is_configured(&self) -> bool {
        self.profile_state == 1
    }

    /// The user's primary group, when one is set.
    pub fn primary_group(&self) -> Option<GroupId> {
        self.primary_clanid.as_deref()?.parse().ok()
    }
}

/// One entry of a user's friend list.
#[derive(Debug, Clone, Deserialize)]
pub struct Friend {
    pub steamid: SteamId,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub friend_since: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_player_summary() {
        let summary: PlayerSummary = serde_json::from_str(r#"{
            "steamid": "76561198132612090",
            "communityvisibilitystate": 3,
            "profilestate": 1,
            "personaname": "gabe",
            "lastlogoff": 1472238198,
            "profileurl": "https://steamcommunity.com/id/gabe/",
            "avatar": "https://avatars.akamai.steamstatic.com/small.jpg",
            "avatarmedium": "https://avatars.akamai.steamstatic.com/medium.jpg",
            "avatarfull": "https://avatars.akamai.steamstatic.com/full.jpg",
            "personastate": 1,
            "primaryclanid": "103582791453729676",
            "timecreated": 1063407589,
            "personastateflags": 0
        }"#).unwrap();

        assert_eq!(summary.steamid, SteamId::new(76561198132612090));
        assert_eq!(summary.display_name, "gabe");
        assert!(summary.is_public());
        assert!(summary.is_configured());
        assert_eq!(summary.primary_group(), Some(103582791453729676));
    }

    #[test]
    fn deserializes_friend() {
        let friend: Friend = serde_json::from_str(r#"{
            "steamid": "76561197960265731",
            "relationship": "friend",
            "friend_since": 1447349026
        }"#).unwrap();

        assert_eq!(friend.steamid, SteamId::new(76561197960265731));
        assert_eq!(friend.friend_since, 1447349026);
    }
}
