//! Client for Steam Community login and chat plus a set of typed accessors
//! for public Steam Web API endpoints.
//!
//! The community login and the chat protocol are not documented by Valve;
//! this crate speaks them the way the official web client does and can
//! break without notice when Steam changes.
//!
//! ```no_run
//! use steam_chat::SteamId;
//!
//! # async fn run() -> Result<(), steam_chat::Error> {
//! let mut session = steam_chat::login("username", "password").await?;
//!
//! session.connect_chat().await?;
//! session.send_message(SteamId::new(76561198132612090), "hello").await?;
//! session.listen(|steamid, text| {
//!     println!("{steamid}: {text}");
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod response;
pub mod serializers;

mod chat;
mod encrypt;
mod helpers;
mod session;
mod steamid;
mod time;
mod types;

pub use chat::PollOptions;
pub use encrypt::encrypt_password;
pub use error::{Error, Result};
pub use session::{login, login_with_captcha, Captcha, Session};
pub use steamid::SteamId;
pub use types::{AccountId, AppId, GroupId};
