//! Logs in, connects chat and prints every incoming message until ctrl-c.

use dotenv::dotenv;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let username = env::var("STEAM_USERNAME")?;
    let password = env::var("STEAM_PASSWORD")?;
    let mut session = steam_chat::login(&username, &password).await?;

    println!("logged in as {}", session.steamid());
    session.connect_chat().await?;

    let listener = session.listen(|steamid, text| {
        println!("{steamid}: {text}");
    });

    // the loop only returns on a fatal poll status; ctrl-c cancels it by
    // dropping the future
    tokio::select! {
        result = listener => result?,
        _ = tokio::signal::ctrl_c() => {}
    }

    session.logout().await;

    Ok(())
}
