//! Redirect-back for visitor actions.
//!
//! Cart and favorite links return the visitor to the page they came from.
//! The `Referer` is only followed when it points back into this site.

use axum::http::{HeaderMap, header};
use axum::response::Redirect;
use url::Url;

/// Where to go when the referrer is missing or foreign.
const FALLBACK: &str = "/";

/// Resolve a `Referer` value into a local redirect target.
///
/// Accepts a site-relative path (`/cart`, but not `//host` or `/\host`) or an
/// absolute URL with the same origin as `base_url`; the latter is reduced to
/// its path and query. Anything else yields `/`.
#[must_use]
pub fn safe_referer(referer: Option<&str>, base_url: &Url) -> String {
    let Some(referer) = referer.map(str::trim).filter(|r| !r.is_empty()) else {
        return FALLBACK.to_owned();
    };

    if referer.starts_with('/') {
        let is_local = !referer.starts_with("//")
            && !referer.contains('\\')
            && !referer.chars().any(char::is_control);
        return if is_local { referer.to_owned() } else { FALLBACK.to_owned() };
    }

    match Url::parse(referer) {
        Ok(url) if url.origin() == base_url.origin() => {
            let mut target = url.path().to_owned();
            if let Some(query) = url.query() {
                target.push('?');
                target.push_str(query);
            }
            target
        }
        _ => FALLBACK.to_owned(),
    }
}

/// Redirect to the referring page of this request, or `/`.
#[must_use]
pub fn redirect_back(headers: &HeaderMap, base_url: &Url) -> Redirect {
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());
    Redirect::to(&safe_referer(referer, base_url))
}
