//! One-shot, keyless-client accessors for public Steam Web API endpoints.
//!
//! These are plain GET-and-decode calls with no session state. Endpoints
//! under `ISteamUser` require a [Steam Web API key](https://steamcommunity.com/dev/apikey).

use crate::error::{Error, Result};
use crate::helpers::{get_default_client, parses_response, API_HOSTNAME, COMMUNITY_HOSTNAME};
use crate::response::{AchievementPercentage, App, AppNewsItem, Friend, PlayerSummary};
use crate::steamid::SteamId;
use crate::types::{AppId, GroupId};
use std::sync::Arc;
use lazy_regex::{regex, regex_captures};
use lazy_static::lazy_static;
use serde::Deserialize;

lazy_static! {
    static ref CLIENT: reqwest::Client = get_default_client(Arc::new(reqwest::cookie::Jar::default()));
}

fn api_url(interface: &str, method: &str, version: u32) -> String {
    format!("{API_HOSTNAME}/{interface}/{method}/v{version}/")
}

/// Gets the latest news items for an app.
pub async fn get_news_for_app(
    appid: AppId,
    count: u32,
    max_length: u32,
) -> Result<Vec<AppNewsItem>> {
    #[derive(Deserialize)]
    struct Response {
        appnews: AppNews,
    }

    #[derive(Deserialize)]
    struct AppNews {
        newsitems: Vec<AppNewsItem>,
    }

    let response = CLIENT.get(api_url("ISteamNews", "GetNewsForApp", 2))
        .query(&[
            ("appid", appid.to_string()),
            ("count", count.to_string()),
            ("maxlength", max_length.to_string()),
            ("format", "json".to_owned()),
        ])
        .send()
        .await?;
    let news: Response = parses_response(response).await?;

    Ok(news.appnews.newsitems)
}

/// Gets the global unlock percentage of every achievement of an app.
pub async fn get_global_achievement_percentages(appid: AppId) -> Result<Vec<AchievementPercentage>> {
    #[derive(Deserialize)]
    struct Response {
        achievementpercentages: Percentages,
    }

    #[derive(Deserialize)]
    struct Percentages {
        achievements: Vec<AchievementPercentage>,
    }

    let response = CLIENT.get(api_url("ISteamUserStats", "GetGlobalAchievementPercentagesForApp", 2))
        .query(&[("gameid", appid.to_string())])
        .send()
        .await?;
    let percentages: Response = parses_response(response).await?;

    Ok(percentages.achievementpercentages.achievements)
}

/// Gets the full app catalog.
pub async fn get_app_list() -> Result<Vec<App>> {
    #[derive(Deserialize)]
    struct Response {
        applist: AppList,
    }

    #[derive(Deserialize)]
    struct AppList {
        apps: Vec<App>,
    }

    let response = CLIENT.get(api_url("ISteamApps", "GetAppList", 2))
        .send()
        .await?;
    let list: Response = parses_response(response).await?;

    Ok(list.applist.apps)
}

/// Gets the current player count of an app.
pub async fn get_number_of_current_players(appid: AppId) -> Result<u64> {
    #[derive(Deserialize)]
    struct Response {
        response: PlayerCount,
    }

    #[derive(Deserialize)]
    struct PlayerCount {
        #[serde(default)]
        player_count: u64,
        result: u8,
    }

    let response = CLIENT.get(api_url("ISteamUserStats", "GetNumberOfCurrentPlayers", 1))
        .query(&[("appid", appid.to_string())])
        .send()
        .await?;
    let count: Response = parses_response(response).await?;

    if count.response.result != 1 {
        return Err(Error::Response(format!("player count unavailable for app {appid}")));
    }

    Ok(count.response.player_count)
}

/// Gets profile summaries for up to 100 users at a time.
pub async fn get_player_summaries(
    key: &str,
    steamids: &[SteamId],
) -> Result<Vec<PlayerSummary>> {
    #[derive(Deserialize)]
    struct Response {
        response: Players,
    }

    #[derive(Deserialize)]
    struct Players {
        players: Vec<PlayerSummary>,
    }

    let steamids = steamids
        .iter()
        .map(|steamid| steamid.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let response = CLIENT.get(api_url("ISteamUser", "GetPlayerSummaries", 2))
        .query(&[("key", key), ("steamids", steamids.as_str())])
        .send()
        .await?;
    let summaries: Response = parses_response(response).await?;

    Ok(summaries.response.players)
}

/// Gets a user's friend list. Fails for private profiles.
pub async fn get_friends_list(key: &str, steamid: SteamId) -> Result<Vec<Friend>> {
    #[derive(Deserialize)]
    struct Response {
        friendslist: FriendsList,
    }

    #[derive(Deserialize)]
    struct FriendsList {
        friends: Vec<Friend>,
    }

    let response = CLIENT.get(api_url("ISteamUser", "GetFriendList", 1))
        .query(&[
            ("key", key.to_owned()),
            ("steamid", steamid.to_string()),
            ("relationship", "friend".to_owned()),
        ])
        .send()
        .await?;
    let list: Response = parses_response(response).await?;

    Ok(list.friendslist.friends)
}

/// Resolves a profile vanity URL name to a Steam ID.
pub async fn resolve_vanity_url(key: &str, vanity_url: &str) -> Result<SteamId> {
    #[derive(Deserialize)]
    struct Response {
        response: VanityUrl,
    }

    #[derive(Deserialize)]
    struct VanityUrl {
        steamid: Option<SteamId>,
        success: u8,
    }

    let response = CLIENT.get(api_url("ISteamUser", "ResolveVanityURL", 1))
        .query(&[("key", key), ("vanityurl", vanity_url)])
        .send()
        .await?;
    let resolved: Response = parses_response(response).await?;

    match resolved.response {
        VanityUrl { steamid: Some(steamid), success: 1 } => Ok(steamid),
        _ => Err(Error::Response(format!("unable to resolve vanity url {vanity_url}"))),
    }
}

/// Gets the member roster of a group from its URL name, e.g. `GOLANG` for
/// `https://steamcommunity.com/groups/GOLANG`.
pub async fn get_group_members(group_name: &str) -> Result<Vec<SteamId>> {
    let body = roster_xml(group_name).await?;
    let members = regex!(r"<steamID64>(\d+)</steamID64>")
        .captures_iter(&body)
        .filter_map(|captures| captures.get(1)?.as_str().parse::<u64>().ok())
        .map(SteamId::new)
        .collect::<Vec<_>>();

    Ok(members)
}

/// Resolves a group's URL name to its 64-bit group ID.
pub async fn resolve_group_id(group_name: &str) -> Result<GroupId> {
    let body = roster_xml(group_name).await?;
    let (_, groupid) = regex_captures!(r"<groupID64>(\d+)</groupID64>", &body)
        .ok_or_else(|| Error::Response(format!("unable to resolve group {group_name}")))?;

    Ok(groupid.parse()
        .map_err(|_| Error::Response(format!("unable to resolve group {group_name}")))?)
}

/// The member list endpoint responds with XML; the handful of values needed
/// from it are picked out with regexes rather than pulling in an XML
/// decoder.
async fn roster_xml(group_name: &str) -> Result<String> {
    let body = CLIENT.get(format!("{COMMUNITY_HOSTNAME}/groups/{group_name}/memberslistxml"))
        .query(&[("xml", "1")])
        .send()
        .await?
        .text()
        .await?;

    Ok(body)
}
