use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use lazy_regex::{regex_captures, regex_replace_all};
use reqwest::cookie::CookieStore;
use reqwest::header;
use serde::de::DeserializeOwned;

pub(crate) const COMMUNITY_HOSTNAME: &str = "https://steamcommunity.com";
pub(crate) const API_HOSTNAME: &str = "https://api.steampowered.com";
pub(crate) const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";
/// Caps every request. Matches the longest wait the chat poll may ask for.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Creates the client used for all requests of a session. The cookie store
/// is shared so cookies survive across requests and can be dropped on
/// logout.
pub(crate) fn get_default_client<T>(cookie_store: Arc<T>) -> reqwest::Client
where
    T: CookieStore + 'static,
{
    let mut headers = header::HeaderMap::new();

    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT_STRING));

    reqwest::ClientBuilder::new()
        .cookie_provider(cookie_store)
        .default_headers(headers)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        // the configuration is static; building it cannot fail at runtime
        .expect("failed to build client")
}

/// Strips the JSONP-style function call some legacy endpoints wrap their
/// JSON bodies in, e.g. `/**/jQuery123({...})`. Bodies that are not wrapped
/// pass through untouched. Kept as its own step so format drift only
/// touches one function.
pub(crate) fn strip_jsonp(body: &str) -> &str {
    let body = body.trim();

    if body.starts_with('{') || !body.ends_with(')') {
        return body;
    }

    match body.find('{') {
        Some(start) => &body[start..body.len() - 1],
        None => body,
    }
}

/// Decodes a response body into `D`, classifying Steam's inconsistent error
/// encodings along the way: JSONP wrappers are stripped and HTML error
/// pages are reduced to their text as an [`Error::Response`].
pub(crate) async fn parses_response<D>(response: reqwest::Response) -> Result<D>
where
    D: DeserializeOwned,
{
    let body = response.text().await?;

    parses_body(&body)
}

pub(crate) fn parses_body<D>(body: &str) -> Result<D>
where
    D: DeserializeOwned,
{
    let payload = strip_jsonp(body);

    match serde_json::from_str::<D>(payload) {
        Ok(decoded) => Ok(decoded),
        Err(parse_error) => {
            // Steam reports some failures as an HTML error page rather than
            // a JSON envelope
            if payload.trim_start().starts_with('<') {
                Err(Error::Response(html_error_text(payload)))
            } else {
                Err(Error::Parse(parse_error))
            }
        }
    }
}

/// Reduces an HTML error page to a single human-readable line.
///
/// The text between `<body>` and `</body>` is kept, `</h1>` becomes `": "`,
/// `<pre>`/`</pre>` become `'`, all remaining simple tags are dropped and
/// entities are decoded. A body without `<body>` delimiters is decoded
/// whole.
pub(crate) fn html_error_text(html: &str) -> String {
    // ascii lowercasing keeps byte offsets valid for slicing the original
    let lowercased = html.to_ascii_lowercase();
    let inner = match lowercased.find("<body>") {
        Some(start) => {
            let start = start + "<body>".len();

            match lowercased[start..].find("</body>") {
                Some(end) => &html[start..start + end],
                None => return html_escape::decode_html_entities(html).into_owned(),
            }
        }
        None => return html_escape::decode_html_entities(html).into_owned(),
    };
    let replaced = regex_replace_all!(r"</?\w+>", inner, |tag: &str| {
        match tag {
            "</h1>" => ": ",
            "<pre>" | "</pre>" => "'",
            _ => "",
        }
    });
    let flattened = replaced.replace('\n', " ");

    html_escape::decode_html_entities(&flattened).into_owned()
}

/// Finds the `g_sessionID` literal on a community page.
pub(crate) fn extract_session_id(body: &str) -> Option<&str> {
    let (_, sessionid) = regex_captures!(r#"g_sessionID\s*=\s*"(\w+)";"#, body)?;

    Some(sessionid)
}

/// Finds the 32-character hexadecimal access token embedded in the chat
/// page's `CWebAPI` initializer.
pub(crate) fn extract_access_token(body: &str) -> Option<&str> {
    let (_, token) = regex_captures!(
        r#"CWebAPI\s*\(\s*(?:[^,]+,){2}\s*"([0-9a-f]{32})"\s*\)"#,
        body
    )?;

    Some(token)
}

/// Finds a pending captcha gid on the login page, if any.
pub(crate) fn extract_captcha_gid(body: &str) -> Option<&str> {
    let (_, gid) = regex_captures!(r#"gidCaptcha:\s*"(-?\w+)""#, body)?;

    // -1 means no captcha is pending
    if gid == "-1" {
        return None;
    }

    Some(gid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_jsonp_wrapper() {
        let body = r#"/**/jQuery1111029492329063082057_1({"error":"OK"})"#;

        assert_eq!(strip_jsonp(body), r#"{"error":"OK"}"#);
    }

    #[test]
    fn leaves_plain_json_alone() {
        let body = r#"{"error":"OK"}"#;

        assert_eq!(strip_jsonp(body), body);
    }

    #[test]
    fn leaves_html_alone() {
        let body = "<html><body><h1>Error</h1></body></html>";

        assert_eq!(strip_jsonp(body), body);
    }

    #[test]
    fn reduces_html_error_page_to_text() {
        let html = "<html><body><h1>Error</h1><pre>Rate limited</pre></body></html>";

        assert_eq!(html_error_text(html), "Error: 'Rate limited'");
    }

    #[test]
    fn decodes_entities_without_body_delimiters() {
        assert_eq!(html_error_text("Access is denied. &quot;Retry&quot; later"), "Access is denied. \"Retry\" later");
    }

    #[test]
    fn collapses_newlines() {
        let html = "<html><body><h1>Error</h1>\n<p>Something\nfailed</p></body></html>";

        assert_eq!(html_error_text(html), "Error:  Something failed");
    }

    #[test]
    fn classifies_html_body_as_response_error() {
        let result = parses_body::<serde_json::Value>("<html><body><h1>Error</h1><pre>Rate limited</pre></body></html>");

        match result {
            Err(crate::error::Error::Response(message)) => assert_eq!(message, "Error: 'Rate limited'"),
            other => panic!("expected a response error, got {other:?}"),
        }
    }

    #[test]
    fn decodes_jsonp_wrapped_payload() {
        let decoded: serde_json::Value = parses_body(r#"/**/jQuery1(  {"umqid":"123"})"#).unwrap();

        assert_eq!(decoded["umqid"], "123");
    }

    #[test]
    fn finds_session_id() {
        let body = r#"<script>g_sessionID = "abc123";</script>"#;

        assert_eq!(extract_session_id(body), Some("abc123"));
        assert_eq!(extract_session_id("<html></html>"), None);
    }

    #[test]
    fn finds_access_token() {
        let body = r#"WebAPI = new CWebAPI( 'https://api.steampowered.com/', 'steamcommunity.com', "0123456789abcdef0123456789abcdef" );"#;

        assert_eq!(extract_access_token(body), Some("0123456789abcdef0123456789abcdef"));
        assert_eq!(extract_access_token("<html></html>"), None);
    }

    #[test]
    fn finds_captcha_gid() {
        let body = r#"gidCaptcha: "3086901202406962215","#;

        assert_eq!(extract_captcha_gid(body), Some("3086901202406962215"));
        assert_eq!(extract_captcha_gid(r#"gidCaptcha: "-1","#), None);
    }
}
