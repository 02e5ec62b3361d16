//! Session credential and the per-call header sets derived from it.

use super::endpoint::Operation;
use std::fmt;

/// Browser-identity headers the API expects. Values are sent byte-for-byte.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("origin", "https://telegram.blum.codes"),
    ("priority", "u=1, i"),
    (
        "sec-ch-ua",
        "\"Chromium\";v=\"128\", \"Not;A=Brand\";v=\"24\", \"Microsoft Edge\";v=\"128\", \"Microsoft Edge WebView2\";v=\"128\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36 Edg/128.0.0.0",
    ),
];

/// Opaque bearer value, sent as the `authorization` header verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Header bundle for one session. Never mutated after construction; each call
/// gets its own copy via [`RequestContext::headers_for`].
#[derive(Debug, Clone)]
pub struct RequestContext {
    base: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(credential: &Credential) -> Self {
        let mut base: Vec<(String, String)> = BROWSER_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // Keep the browser's ordering: authorization sits right after accept-language.
        base.insert(2, ("authorization".to_string(), credential.expose().to_string()));
        Self { base }
    }

    /// Headers for a single call.
    ///
    /// - balance: the base bundle
    /// - start-play: no body, so `content-length: 0` and no content-type
    /// - claim: JSON body, so `content-type: application/json`; the length is
    ///   left to the transport
    pub fn headers_for(&self, operation: Operation) -> Vec<(String, String)> {
        let mut headers = self.base.clone();
        match operation {
            Operation::Balance => {}
            Operation::StartPlay => {
                headers.push(("content-length".to_string(), "0".to_string()));
            }
            Operation::Claim => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
            }
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn credential_is_sent_verbatim() {
        let ctx = RequestContext::new(&Credential::new("Bearer abc.def"));
        let headers = ctx.headers_for(Operation::Balance);
        assert_eq!(get(&headers, "authorization"), Some("Bearer abc.def"));
        assert_eq!(headers[2].0, "authorization");
    }

    #[test]
    fn per_call_headers_differ_only_in_body_framing() {
        let ctx = RequestContext::new(&Credential::new("Bearer t"));

        let balance = ctx.headers_for(Operation::Balance);
        assert_eq!(get(&balance, "content-type"), None);
        assert_eq!(get(&balance, "content-length"), None);

        let play = ctx.headers_for(Operation::StartPlay);
        assert_eq!(get(&play, "content-type"), None);
        assert_eq!(get(&play, "content-length"), Some("0"));

        let claim = ctx.headers_for(Operation::Claim);
        assert_eq!(get(&claim, "content-type"), Some("application/json"));
        assert_eq!(get(&claim, "content-length"), None);

        // Deriving claim headers must not leak into later calls.
        let again = ctx.headers_for(Operation::StartPlay);
        assert_eq!(again, play);
    }

    #[test]
    fn browser_identity_values_are_exact() {
        let ctx = RequestContext::new(&Credential::new("Bearer t"));
        let headers = ctx.headers_for(Operation::Balance);
        assert_eq!(get(&headers, "origin"), Some("https://telegram.blum.codes"));
        assert_eq!(get(&headers, "sec-ch-ua-platform"), Some("\"Windows\""));
        assert_eq!(headers.len(), BROWSER_HEADERS.len() + 1);
    }

    #[test]
    fn debug_does_not_leak_token() {
        let rendered = format!("{:?}", Credential::new("Bearer secret"));
        assert!(!rendered.contains("secret"));
    }
}
