use crate::encrypt::encrypt_password;
use crate::error::{Error, Result};
use crate::helpers::{
    extract_captcha_gid,
    extract_session_id,
    get_default_client,
    parses_response,
    COMMUNITY_HOSTNAME,
};
use crate::steamid::SteamId;
use crate::time::timestamp_millis;
use crate::types::GroupId;
use std::fmt;
use std::sync::Arc;
use log::{debug, warn};
use reqwest::cookie::Jar;
use serde::Deserialize;

/// A solved captcha challenge. The gid comes from
/// [`Error::CaptchaRequired`]; the text is the solution read from
/// `https://steamcommunity.com/login/rendercaptcha/?gid=<gid>`.
#[derive(Debug, Clone)]
pub struct Captcha {
    pub gid: String,
    pub text: String,
}

/// An authenticated binding to Steam: the login cookies plus the secondary
/// chat-layer credentials once [`Session::connect_chat`] has been called.
///
/// A session is either fully unauthenticated or fully authenticated;
/// [`login`] only returns once every step of the handshake succeeded.
pub struct Session {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) steamid: SteamId,
    pub(crate) client: reqwest::Client,
    pub(crate) cookies: Arc<Jar>,
    pub(crate) access_token: Option<String>,
    pub(crate) umqid: Option<String>,
    pub(crate) message_base: u64,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("steamid", &self.steamid)
            .field("chat_connected", &self.umqid.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RsaKeyResponse {
    success: bool,
    #[serde(default)]
    publickey_mod: String,
    #[serde(default)]
    publickey_exp: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    token_gid: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    login_complete: bool,
    #[serde(default)]
    requires_twofactor: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    transfer_urls: Vec<String>,
    transfer_parameters: Option<TransferParameters>,
}

#[derive(Debug, Deserialize)]
struct TransferParameters {
    steamid: SteamId,
    token: String,
    auth: String,
    token_secure: String,
}

/// Logs into Steam and returns an authenticated [`Session`].
///
/// Fails with [`Error::CaptchaRequired`] when Steam demands a captcha for
/// this account; solve it and retry with [`login_with_captcha`].
pub async fn login(username: &str, password: &str) -> Result<Session> {
    login_with_captcha(username, password, None).await
}

/// Logs into Steam supplying a solved captcha challenge.
pub async fn login_with_captcha(
    username: &str,
    password: &str,
    captcha: Option<Captcha>,
) -> Result<Session> {
    let cookies = Arc::new(Jar::default());
    let client = get_default_client(Arc::clone(&cookies));
    let steamid = perform_login(&client, username, password, captcha.as_ref()).await?;

    Ok(Session {
        username: username.to_owned(),
        password: password.to_owned(),
        steamid,
        client,
        cookies,
        access_token: None,
        umqid: None,
        message_base: 0,
    })
}

/// Runs the login handshake over the given client: RSA key retrieval,
/// captcha probe, encrypted credential submission, then the session
/// transfer to every cooperating subdomain.
async fn perform_login(
    client: &reqwest::Client,
    username: &str,
    password: &str,
    captcha: Option<&Captcha>,
) -> Result<SteamId> {
    let response = client.post(format!("{COMMUNITY_HOSTNAME}/login/getrsakey/"))
        .form(&[
            ("donotcache", timestamp_millis().to_string()),
            ("username", username.to_owned()),
        ])
        .send()
        .await?;
    let rsa_key: RsaKeyResponse = parses_response(response).await?;

    if !rsa_key.success {
        return Err(Error::KeyRetrieval);
    }

    debug!("retrieved RSA key (token gid {})", rsa_key.token_gid);

    let (captcha_gid, captcha_text) = match captcha {
        Some(captcha) => (captcha.gid.clone(), captcha.text.clone()),
        None => {
            // probe whether Steam wants a captcha for this attempt; the
            // caller has to solve it and try again
            let body = client.get(format!("{COMMUNITY_HOSTNAME}/login/home/?goto=0"))
                .send()
                .await?
                .text()
                .await?;

            if let Some(gid) = extract_captcha_gid(&body) {
                return Err(Error::CaptchaRequired(gid.to_owned()));
            }

            ("-1".to_owned(), String::new())
        }
    };
    let encrypted_password = encrypt_password(
        password,
        &rsa_key.publickey_mod,
        &rsa_key.publickey_exp,
    )?;
    let response = client.post(format!("{COMMUNITY_HOSTNAME}/login/dologin/"))
        .form(&[
            ("donotcache", timestamp_millis().to_string()),
            ("username", username.to_owned()),
            ("password", encrypted_password),
            ("rsatimestamp", rsa_key.timestamp),
            ("captchagid", captcha_gid),
            ("captcha_text", captcha_text),
        ])
        .send()
        .await?;
    let login: LoginResponse = parses_response(response).await?;

    if !login.success || !login.login_complete {
        if login.requires_twofactor {
            return Err(Error::AuthenticationFailed("two-factor authentication required".to_owned()));
        }

        return Err(Error::AuthenticationFailed(login.message));
    }

    let transfer = login.transfer_parameters
        .ok_or_else(|| Error::AuthenticationFailed("login response is missing transfer parameters".to_owned()))?;

    // propagate the authenticated cookies to each cooperating subdomain; a
    // partial session is not usable, so any failure here fails the login
    for transfer_url in &login.transfer_urls {
        client.post(transfer_url)
            .form(&[
                ("steamid", transfer.steamid.to_string()),
                ("token", transfer.token.clone()),
                ("auth", transfer.auth.clone()),
                ("token_secure", transfer.token_secure.clone()),
                ("remember_login", "true".to_owned()),
            ])
            .send()
            .await?
            .error_for_status()?;
    }

    debug!("logged in as {}", transfer.steamid);

    Ok(transfer.steamid)
}

impl Session {
    /// The account's canonical 64-bit Steam ID.
    pub fn steamid(&self) -> SteamId {
        self.steamid
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Authenticates again over the existing cookie store, replacing the
    /// session's tokens. Chat must be reconnected afterwards.
    pub async fn relogin(&mut self) -> Result<()> {
        self.relogin_with_captcha(None).await
    }

    /// Authenticates again supplying a solved captcha challenge.
    pub async fn relogin_with_captcha(&mut self, captcha: Option<Captcha>) -> Result<()> {
        self.steamid = perform_login(
            &self.client,
            &self.username,
            &self.password,
            captcha.as_ref(),
        ).await?;
        self.access_token = None;
        self.umqid = None;
        self.message_base = 0;

        Ok(())
    }

    /// Logs out. The server-side logout is best-effort, but the local
    /// cookies and tokens are discarded unconditionally.
    pub async fn logout(&mut self) {
        let result: Result<()> = async {
            let sessionid = self.session_id().await?;

            self.client.post(format!("{COMMUNITY_HOSTNAME}/login/logout/"))
                .form(&[("sessionid", sessionid)])
                .send()
                .await?;

            Ok(())
        }.await;

        if let Err(error) = result {
            warn!("logout request failed: {error}");
        }

        self.cookies = Arc::new(Jar::default());
        self.client = get_default_client(Arc::clone(&self.cookies));
        self.access_token = None;
        self.umqid = None;
        self.message_base = 0;
    }

    /// Whether the community site still recognizes this session's cookies.
    pub async fn is_logged_in(&self) -> bool {
        let body = match self.client.get(format!("{COMMUNITY_HOSTNAME}/")).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(_) => return false,
            },
            Err(_) => return false,
        };

        !body.contains("https://steamcommunity.com/login/home")
    }

    /// The `sessionid` value embedded in community pages, required by
    /// community actions such as group invites.
    pub async fn session_id(&self) -> Result<String> {
        let body = self.client.get(format!("{COMMUNITY_HOSTNAME}/"))
            .send()
            .await?
            .text()
            .await?;

        extract_session_id(&body)
            .map(str::to_owned)
            .ok_or(Error::SessionId)
    }

    /// Invites users to a Steam group.
    pub async fn invite_to_group(
        &self,
        group: GroupId,
        recipients: &[SteamId],
    ) -> Result<()> {
        #[derive(Deserialize)]
        struct GroupInviteResponse {
            #[serde(default)]
            results: String,
        }

        let sessionid = self.session_id().await?;
        let invitee_list = serde_json::to_string(
            &recipients
                .iter()
                .map(|steamid| steamid.to_string())
                .collect::<Vec<_>>(),
        )?;
        let response = self.client.post(format!("{COMMUNITY_HOSTNAME}/actions/GroupInvite"))
            .form(&[
                ("json", "1".to_owned()),
                ("type", "groupInvite".to_owned()),
                ("group", group.to_string()),
                ("sessionID", sessionid),
                ("invitee_list", invitee_list),
            ])
            .send()
            .await?;
        let invite: GroupInviteResponse = parses_response(response).await?;

        if invite.results != "OK" {
            return Err(Error::Response(invite.results));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::parses_body;

    #[test]
    fn deserializes_rsa_key_response() {
        let response: RsaKeyResponse = parses_body(r#"{
            "success": true,
            "publickey_mod": "c136c27d",
            "publickey_exp": "010001",
            "timestamp": "216361350000",
            "token_gid": "28902c1222db5be2"
        }"#).unwrap();

        assert!(response.success);
        assert_eq!(response.publickey_exp, "010001");
        assert_eq!(response.timestamp, "216361350000");
    }

    #[test]
    fn deserializes_failed_rsa_key_response() {
        let response: RsaKeyResponse = parses_body(r#"{"success":false}"#).unwrap();

        assert!(!response.success);
    }

    #[test]
    fn deserializes_login_response() {
        let response: LoginResponse = parses_body(r#"{
            "success": true,
            "requires_twofactor": false,
            "login_complete": true,
            "transfer_urls": [
                "https://store.steampowered.com/login/transfer",
                "https://help.steampowered.com/login/transfer"
            ],
            "transfer_parameters": {
                "steamid": "76561198132612090",
                "token": "f7d5a3c2...",
                "auth": "13df0e8d...",
                "remember_login": false,
                "token_secure": "db94af25..."
            }
        }"#).unwrap();
        let transfer = response.transfer_parameters.unwrap();

        assert!(response.success);
        assert!(response.login_complete);
        assert_eq!(response.transfer_urls.len(), 2);
        assert_eq!(transfer.steamid, SteamId::new(76561198132612090));
        assert_eq!(transfer.token_secure, "db94af25...");
    }

    #[test]
    fn deserializes_rejected_login_response() {
        let response: LoginResponse = parses_body(r#"{
            "success": false,
            "requires_twofactor": false,
            "message": "The account name or password that you have entered is incorrect.",
            "captcha_needed": true,
            "captcha_gid": "3086901202406962215"
        }"#).unwrap();

        assert!(!response.success);
        assert!(response.message.starts_with("The account name"));
        assert!(response.transfer_parameters.is_none());
    }

    #[test]
    fn debug_output_redacts_password() {
        let cookies = Arc::new(Jar::default());
        let session = Session {
            username: "user".to_owned(),
            password: "hunter2".to_owned(),
            steamid: SteamId::new(76561198132612090),
            client: get_default_client(Arc::clone(&cookies)),
            cookies,
            access_token: None,
            umqid: None,
            message_base: 0,
        };

        assert!(!format!("{session:?}").contains("hunter2"));
    }
}
