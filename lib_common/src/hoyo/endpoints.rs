use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

/// Base URL of the HoYoLAB community API.
const BASE_URL_HOYOLAB: &str = "https://bbs-api-os.hoyolab.com/";
/// Base URL of the SG public API.
const BASE_URL_SG: &str = "https://sg-public-api.hoyolab.com/";

#[derive(Debug, Error)]
/// Rejections of the credential set supplied at process start.
pub enum CredentialError {
    /// A credential field is empty.
    #[error("credential field '{0}' must not be empty")]
    Missing(&'static str),
}

/// The three opaque strings identifying an account session.
///
/// Supplied once at startup, held in memory only, never mutated.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account session id (the `ltuid` cookie).
    pub ltuid: String,
    /// Account session token (the `ltoken` cookie).
    pub ltoken: String,
    /// The in-game account id.
    pub uid: String,
}

impl Credentials {
    /// Rejects empty fields. No other validation: the strings are opaque
    /// and the remote APIs are the authority on their contents.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.ltuid.trim().is_empty() {
            return Err(CredentialError::Missing("ltuid"));
        }
        if self.ltoken.trim().is_empty() {
            return Err(CredentialError::Missing("ltoken"));
        }
        if self.uid.trim().is_empty() {
            return Err(CredentialError::Missing("uid"));
        }
        Ok(())
    }
}

/// One named remote HTTP resource the aggregator queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// The name keying this endpoint's slot in the aggregated record.
    pub name: String,
    /// The absolute URL, without query parameters.
    pub url: String,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
}

impl EndpointDescriptor {
    /// Creates a descriptor with no query parameters.
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            query: Vec::new(),
        }
    }

    /// Adds one query parameter.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// The full request URL with query parameters expanded.
    ///
    /// A malformed base URL is returned untouched; the fetch layer rejects
    /// it with a proper transport error.
    pub fn request_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        match Url::parse(&self.url) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                url.to_string()
            }
            Err(_) => self.url.clone(),
        }
    }
}

/// The built-in endpoint catalogue for one account.
///
/// Slot names: `profile`, `wish_history`, `game_record`, `daily_reward`.
pub fn default_endpoints(uid: &str) -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::new(
            "profile",
            &format!("{}community/user/wapi/getUserFullInfo", BASE_URL_HOYOLAB),
        )
        .with_query("gid", "2"),
        EndpointDescriptor::new(
            "wish_history",
            &format!("{}community/account/wish/history", BASE_URL_HOYOLAB),
        )
        .with_query("uid", uid),
        EndpointDescriptor::new(
            "game_record",
            &format!("{}event/game_record/genshin/api/index", BASE_URL_SG),
        )
        .with_query("role_id", uid),
        EndpointDescriptor::new("daily_reward", &format!("{}event/sol/info", BASE_URL_SG))
            .with_query("act_id", "e202102251931481"),
    ]
}

/// Builds the authenticated header set attached to every endpoint request:
/// browser-mimic headers plus the session cookie pair and the account id.
pub fn auth_headers(credentials: &Credentials) -> HeaderMap {
    let cookie = format!(
        "ltuid={}; ltoken={};",
        credentials.ltuid, credentials.ltoken
    );

    let header_list = [
        ("accept", "application/json, text/plain, */*"),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "no-cache"),
        ("origin", "https://www.hoyolab.com"),
        ("referer", "https://www.hoyolab.com/"),
        (
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
        ),
        ("cookie", cookie.as_str()),
        ("x-rpc-uid", credentials.uid.as_str()),
        ("x-rpc-ltuid", credentials.ltuid.as_str()),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in header_list {
        if let (Ok(h_name), Ok(h_value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(h_name, h_value);
        }
    }

    headers
}
