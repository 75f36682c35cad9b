use std::num::ParseIntError;

/// Any error that can occur while talking to Steam.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    /// Steam responded with an error. The contained message is either taken
    /// from the JSON error envelope or extracted out of an HTML error page.
    #[error("Unexpected response: {}", .0)]
    Response(String),
    #[error("{}", .0)]
    ParseSteamId(#[from] ParseSteamIdError),
    #[error("{}", .0)]
    Encrypt(#[from] EncryptError),
    #[error("Failed to retrieve RSA key")]
    KeyRetrieval,
    /// A captcha must be solved before the login can proceed. Render the
    /// captcha at `https://steamcommunity.com/login/rendercaptcha/?gid=<gid>`
    /// and call [`crate::login_with_captcha`] with the solved text.
    #[error("Captcha required (gid {})", .0)]
    CaptchaRequired(String),
    /// The login was rejected. The message is the human-readable reason
    /// supplied by Steam.
    #[error("Failed to login: {}", .0)]
    AuthenticationFailed(String),
    /// No access token literal was found on the chat page. This extraction
    /// depends on an exact client-side script format which Steam can change
    /// at any time.
    #[error("No access token available")]
    AccessToken,
    #[error("Chat logon failed: {}", .0)]
    ChatLogon(String),
    /// The poll loop received a fatal status and terminated. The session is
    /// still authenticated but chat must be reconnected.
    #[error("Chat poll failed: {}", .0)]
    ChatPoll(String),
    #[error("Chat is not connected")]
    ChatNotConnected,
    #[error("No sessionid available")]
    SessionId,
    #[error("Not logged in")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, Error>;

/// An error occurred parsing a Steam ID.
#[derive(thiserror::Error, Debug)]
pub enum ParseSteamIdError {
    #[error("Malformed Steam ID: {}", .0)]
    Malformed(&'static str),
    #[error("Malformed Steam ID: {}", .0)]
    ParseInt(#[from] ParseIntError),
}

/// An error occurred encrypting a password.
#[derive(thiserror::Error, Debug)]
pub enum EncryptError {
    /// One of the server-supplied hex strings did not parse as an integer.
    #[error("Unable to parse {} as hex", .0)]
    KeyParse(&'static str),
    /// The cryptographic operation itself failed, e.g. the plaintext exceeds
    /// the modulus-derived maximum message length.
    #[error("{}", .0)]
    Rsa(#[from] rsa::Error),
}
