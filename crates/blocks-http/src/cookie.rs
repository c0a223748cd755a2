use std::time::SystemTime;

use url::Url;

use super::CookieError;

/// An HTTP cookie as held by the credential jar.
///
/// A cookie with a `domain` is sent to that domain and its subdomains. A cookie without one is
/// sent to every host.
#[derive(Clone, Debug, PartialEq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain
    pub domain: Option<String>,
    /// Cookie path
    pub path: Option<String>,
    /// Cookie expiration timestamp, `None` for session cookies
    pub expires: Option<SystemTime>,
    /// Secure attribute (HTTPS-only)
    pub secure: bool,
    /// HttpOnly attribute (prevents JavaScript access)
    pub http_only: bool,
}

impl Cookie {
    /// Creates a new session cookie.
    ///
    /// Defaults: path="/", no domain, secure=false, http_only=false, no expiration.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: Some("/".to_string()),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Session cookies never expire while the process runs.
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires < SystemTime::now())
    }

    /// Checks that the cookie can be stored and later serialized into a `Cookie` header.
    ///
    /// Only the structure is checked. Like the platform cookie storage, the jar accepts
    /// `__Host-` and `__Secure-` names without enforcing their prefix rules.
    pub fn validate(&self) -> Result<(), CookieError> {
        if self.name.is_empty() {
            return Err(CookieError::InvalidCookie("name is empty".to_string()));
        }
        if let Some(c) = self.name.chars().find(|c| !is_token_char(*c)) {
            return Err(CookieError::InvalidCookie(format!(
                "name {:?} contains {c:?}",
                self.name
            )));
        }
        if self.value.chars().any(|c| c == ';' || c.is_control()) {
            return Err(CookieError::InvalidCookie(format!(
                "value of {:?} contains a separator or control character",
                self.name
            )));
        }
        if self.domain.as_deref().is_some_and(|d| d.trim_matches('.').is_empty()) {
            return Err(CookieError::InvalidCookie(format!(
                "domain of {:?} is empty",
                self.name
            )));
        }
        if self.path.as_deref().is_some_and(|p| !p.starts_with('/')) {
            return Err(CookieError::InvalidCookie(format!(
                "path of {:?} must start with '/'",
                self.name
            )));
        }

        Ok(())
    }

    /// Whether this cookie should be attached to a request for `url`.
    pub fn matches(&self, url: &Url) -> bool {
        if self.is_expired() {
            return false;
        }
        if self.secure && url.scheme() != "https" {
            return false;
        }

        if let Some(domain) = &self.domain {
            let Some(host) = url.host_str() else {
                return false;
            };
            let host = host.to_ascii_lowercase();
            let domain = domain.trim_start_matches('.').to_ascii_lowercase();
            let on_domain = host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'));
            if !on_domain {
                return false;
            }
        }

        match self.path.as_deref() {
            None | Some("/") => true,
            Some(cookie_path) => {
                let request_path = url.path();
                request_path == cookie_path
                    || request_path
                        .strip_prefix(cookie_path)
                        .is_some_and(|rest| cookie_path.ends_with('/') || rest.starts_with('/'))
            }
        }
    }

    /// The `name=value` pair as it appears in a `Cookie` request header.
    pub fn to_cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c)
}
