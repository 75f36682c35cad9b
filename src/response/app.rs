use crate::types::AppId;
use serde::Deserialize;

/// A news item for an app.
#[derive(Debug, Clone, Deserialize)]
pub struct AppNewsItem {
    #[serde(with = "crate::serializers::string")]
    pub gid: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub feedlabel: String,
    pub date: u64,
}

/// The global unlock rate of one achievement.
#[derive(Debug, Clone, Deserialize)]
pub struct AchievementPercentage {
    pub name: String,
    pub percent: f64,
}

/// An entry of the full app catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub appid: AppId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_news_item() {
        let item: AppNewsItem = serde_json::from_str(r#"{
            "gid": "519572573267514902",
            "title": "Team Fortress 2 Update Released",
            "url": "http://store.steampowered.com/news/externalpost/tf2_blog/519572573267514902",
            "is_external_url": true,
            "author": "",
            "contents": "An update to Team Fortress 2 has been released.",
            "feedlabel": "TF2 Blog",
            "date": 1472164674
        }"#).unwrap();

        assert_eq!(item.gid, 519572573267514902);
        assert_eq!(item.date, 1472164674);
    }

    #[test]
    fn deserializes_achievement_percentage() {
        let achievement: AchievementPercentage = serde_json::from_str(
            r#"{"name":"SCOUT_KILL_STUNNED","percent":34.5}"#,
        ).unwrap();

        assert_eq!(achievement.name, "SCOUT_KILL_STUNNED");
        assert_eq!(achievement.percent, 34.5);
    }
}
