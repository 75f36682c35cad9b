//! The chat layer of a [`Session`]: the secondary access-token logon and
//! the long-poll receive loop.

use crate::error::{Error, Result};
use crate::helpers::{extract_access_token, parses_response, API_HOSTNAME, COMMUNITY_HOSTNAME};
use crate::session::Session;
use crate::steamid::SteamId;
use crate::time::timestamp_millis;
use crate::types::AccountId;
use std::time::Duration;
use lazy_regex::regex;
use log::{debug, warn};
use serde::Deserialize;

const LOGON_URL: &str = "ISteamWebUserPresenceOAuth/Logon/v0001/";
const POLL_URL: &str = "ISteamWebUserPresenceOAuth/Poll/v0001/";
const MESSAGE_URL: &str = "ISteamWebUserPresenceOAuth/Message/v0001/";

/// Controls the adaptive wait of the long-poll loop.
///
/// The requested server-side wait starts at `initial_timeout_secs` and grows
/// by `timeout_step_secs` on every `Timeout` response, never exceeding
/// `max_timeout_secs`. A larger wait suggested by the server is adopted.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub initial_timeout_secs: u64,
    pub max_timeout_secs: u64,
    pub timeout_step_secs: u64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_timeout_secs: 20,
            max_timeout_secs: 120,
            timeout_step_secs: 5,
        }
    }
}

/// The loop's positional state. Both values come back from the server on
/// every response and are fed into the next request verbatim; the server is
/// the sole source of truth for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PollCursor {
    pollid: u64,
    message: u64,
}

impl PollCursor {
    fn advance(&mut self, reported_pollid: Option<u64>, reported_messagelast: Option<u64>) {
        if let Some(messagelast) = reported_messagelast {
            self.message = messagelast;
        }

        if let Some(pollid) = reported_pollid {
            self.pollid = pollid + 1;
        }
    }
}

fn next_poll_timeout(current: u64, suggested: Option<u64>, options: &PollOptions) -> u64 {
    let mut next = current;

    match suggested {
        Some(suggested) => {
            if suggested > next {
                next = suggested.min(options.max_timeout_secs);
            }

            if suggested < options.max_timeout_secs {
                next = (next + options.timeout_step_secs).min(options.max_timeout_secs);
            }
        }
        None => {
            next = (next + options.timeout_step_secs).min(options.max_timeout_secs);
        }
    }

    next
}

#[derive(Debug, Deserialize)]
struct LogonResponse {
    error: String,
    #[serde(default)]
    umqid: String,
    #[serde(default)]
    message: u64,
    steamid: Option<SteamId>,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    error: String,
    pollid: Option<u64>,
    sectimeout: Option<u64>,
    #[serde(default)]
    messages: Vec<WireMessage>,
    messagelast: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    accountid_from: AccountId,
    #[serde(default)]
    text: String,
}

impl WireMessage {
    /// Only non-empty text chat entries are delivered to the callback; the
    /// poll stream also carries typing notifications and state changes.
    fn is_chat_text(&self) -> bool {
        self.kind == "saytext" && !self.text.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    error: String,
}

impl Session {
    /// Establishes the chat layer: scrapes the access token off the chat
    /// page and performs the presence logon, storing the token and the
    /// message queue id (`umqid`) on the session.
    pub async fn connect_chat(&mut self) -> Result<()> {
        let body = self.client.get(format!("{COMMUNITY_HOSTNAME}/chat"))
            .send()
            .await?
            .text()
            .await?;
        if body.contains("https://steamcommunity.com/login/home") {
            return Err(Error::NotLoggedIn);
        }

        let access_token = extract_access_token(&body)
            .ok_or(Error::AccessToken)?
            .to_owned();
        let response = self.client.post(format!("{API_HOSTNAME}/{LOGON_URL}"))
            .form(&[
                ("jsonp", "1".to_owned()),
                ("ui_mode", "web".to_owned()),
                ("access_token", access_token.clone()),
                ("_", timestamp_millis().to_string()),
            ])
            .send()
            .await?;
        let logon: LogonResponse = parses_response(response).await?;

        if logon.error != "OK" {
            return Err(Error::ChatLogon(logon.error));
        }

        if logon.umqid.is_empty() {
            return Err(Error::ChatLogon("response is missing umqid".to_owned()));
        }

        debug!("chat connected (umqid {})", logon.umqid);

        if let Some(steamid) = logon.steamid {
            self.steamid = steamid;
        }

        self.message_base = logon.message;
        self.umqid = Some(logon.umqid);
        self.access_token = Some(access_token);

        Ok(())
    }

    fn chat_credentials(&self) -> Result<(&str, &str)> {
        match (self.access_token.as_deref(), self.umqid.as_deref()) {
            (Some(access_token), Some(umqid)) => Ok((access_token, umqid)),
            _ => Err(Error::ChatNotConnected),
        }
    }

    /// Sends a chat message. Safe to call while a [`Session::listen`] loop
    /// is running; sends are independent requests keyed only by the access
    /// token.
    pub async fn send_message(&self, recipient: SteamId, text: &str) -> Result<()> {
        let (access_token, umqid) = self.chat_credentials()?;
        let response = self.client.post(format!("{API_HOSTNAME}/{MESSAGE_URL}"))
            .form(&[
                ("steamid_dst", recipient.to_string()),
                ("text", text.to_owned()),
                ("umqid", umqid.to_owned()),
                ("access_token", access_token.to_owned()),
                ("type", "saytext".to_owned()),
                ("jsonp", "1".to_owned()),
                ("_", timestamp_millis().to_string()),
            ])
            .send()
            .await?;
        let message: MessageResponse = parses_response(response).await?;

        if !message.error.eq_ignore_ascii_case("ok") {
            return Err(Error::Response(message.error));
        }

        Ok(())
    }

    /// Listens for incoming chat messages, invoking the callback with the
    /// sender's canonical Steam ID and the message text.
    ///
    /// The loop runs until a fatal poll status is received; to stop it
    /// early, drop the future (e.g. run it under `tokio::select!` or abort
    /// its task). A session's listen loop must be driven by one task at a
    /// time.
    pub async fn listen<F>(&self, on_message: F) -> Result<()>
    where
        F: FnMut(SteamId, String),
    {
        self.listen_with(PollOptions::default(), on_message).await
    }

    /// [`Session::listen`] with explicit [`PollOptions`].
    pub async fn listen_with<F>(&self, options: PollOptions, mut on_message: F) -> Result<()>
    where
        F: FnMut(SteamId, String),
    {
        let (access_token, umqid) = self.chat_credentials()?;
        let mut cursor = PollCursor {
            pollid: 1,
            message: self.message_base,
        };
        let mut sectimeout = options.initial_timeout_secs;

        loop {
            let response = self.client.get(format!("{API_HOSTNAME}/{POLL_URL}"))
                .query(&[
                    ("jsonp", "1".to_owned()),
                    ("umqid", umqid.to_owned()),
                    ("message", cursor.message.to_string()),
                    ("pollid", cursor.pollid.to_string()),
                    ("sectimeout", sectimeout.to_string()),
                    ("secidletime", "0".to_owned()),
                    ("use_accountids", "1".to_owned()),
                    ("access_token", access_token.to_owned()),
                    ("_", timestamp_millis().to_string()),
                ])
                // leave the server room to exhaust the requested wait
                .timeout(Duration::from_secs(sectimeout + 10))
                .send()
                .await?;
            let poll: PollResponse = parses_response(response).await?;

            match poll.error.as_str() {
                "OK" => {}
                "Timeout" => {
                    sectimeout = next_poll_timeout(sectimeout, poll.sectimeout, &options);
                }
                _ => return Err(Error::ChatPoll(poll.error)),
            }

            let reported_pollid = poll.pollid;
            let reported_messagelast = poll.messagelast;

            for message in poll.messages {
                if message.is_chat_text() {
                    on_message(SteamId::from_account_id(message.accountid_from), message.text);
                }
            }

            cursor.advance(reported_pollid, reported_messagelast);
        }
    }

    /// Sends a message to every friend on the account's profile roster.
    /// Individual failures are logged and do not abort the rest of the
    /// batch.
    pub async fn broadcast(&self, text: &str) -> Result<()> {
        let body = self.client.get(format!("{COMMUNITY_HOSTNAME}/profiles/{}/friends", self.steamid))
            .send()
            .await?
            .text()
            .await?;
        let friends = regex!(r#"name="friends\[(\d+)\]""#)
            .captures_iter(&body)
            .filter_map(|captures| captures.get(1)?.as_str().parse::<u64>().ok())
            .map(SteamId::new)
            .collect::<Vec<_>>();
        let sends = friends
            .iter()
            .map(|&friend| async move { (friend, self.send_message(friend, text).await) });

        for (friend, result) in futures::future::join_all(sends).await {
            if let Err(error) = result {
                warn!("failed to message {friend}: {error}");
            }
        }

        Ok(())
    }
}
