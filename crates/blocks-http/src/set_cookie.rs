use std::time::{Duration, SystemTime};

use url::Url;

use super::Cookie;

/// Parse one `Set-Cookie` response header received for `request_url`.
///
/// Without a `Domain` attribute the cookie is scoped to the request host, and without a valid
/// `Path` to the directory of the request path (RFC 6265 section 5.1.4). `Max-Age` wins over
/// `Expires`; a `Max-Age` of zero or less produces an already expired cookie, which replaces and
/// thereby removes a stored cookie with the same identity. Returns `None` for headers that do not
/// carry a `name=value` pair or whose `Domain` does not cover the request host.
pub fn parse_set_cookie(header: &str, request_url: &Url) -> Option<Cookie> {
    let host = request_url.host_str()?.to_ascii_lowercase();

    let mut segments = header.split(';');
    let (name, value) = segments.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = Cookie {
        domain: Some(host.clone()),
        path: Some(default_path(request_url)),
        ..Cookie::new(name, value.trim().trim_matches('"'))
    };
    let mut max_age = None;
    let mut expires = None;

    for attribute in segments {
        let (attr_name, attr_value) = attribute
            .split_once('=')
            .map(|(name, value)| (name.trim(), value.trim()))
            .unwrap_or((attribute.trim(), ""));

        match attr_name.to_ascii_lowercase().as_str() {
            "domain" => {
                let domain = attr_value.trim_start_matches('.').to_ascii_lowercase();
                if domain.is_empty() {
                    continue;
                }
                let covers_host = host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|rest| rest.ends_with('.'));
                if !covers_host {
                    tracing::debug!(
                        cookie_name = name,
                        %domain,
                        %host,
                        "Ignoring cookie for a domain that does not cover the host"
                    );
                    return None;
                }
                cookie.domain = Some(domain);
            }
            "path" if attr_value.starts_with('/') => cookie.path = Some(attr_value.to_string()),
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            "max-age" => max_age = attr_value.parse::<i64>().ok(),
            "expires" => {
                expires = chrono::DateTime::parse_from_rfc2822(attr_value)
                    .ok()
                    .map(SystemTime::from)
            }
            _ => {}
        }
    }

    cookie.expires = match max_age {
        Some(seconds) if seconds <= 0 => Some(SystemTime::UNIX_EPOCH),
        Some(seconds) => SystemTime::now().checked_add(Duration::from_secs(seconds.unsigned_abs())),
        None => expires,
    };

    Some(cookie)
}

fn default_path(url: &Url) -> String {
    match url.path().rsplit_once('/') {
        Some((directory, _)) if !directory.is_empty() => directory.to_string(),
        _ => "/".to_string(),
    }
}
