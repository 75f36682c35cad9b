//! Fetches a few public Web API endpoints for Team Fortress 2.

const TEAM_FORTRESS_2: u32 = 440;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let players = steam_chat::api::get_number_of_current_players(TEAM_FORTRESS_2).await?;

    println!("{players} players in game");

    for item in steam_chat::api::get_news_for_app(TEAM_FORTRESS_2, 3, 300).await? {
        println!("{}: {}", item.title, item.url);
    }

    let mut achievements = steam_chat::api::get_global_achievement_percentages(TEAM_FORTRESS_2).await?;

    achievements.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    for achievement in achievements.iter().take(5) {
        println!("{}: {:.1}%", achievement.name, achievement.percent);
    }

    Ok(())
}
