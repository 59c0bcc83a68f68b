use lazy_static::lazy_static;
use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Accepts http(s) URLs: scheme, non-empty host, optional port and
/// path/query/fragment, no whitespace anywhere.
pub fn is_valid_url(url: &str) -> bool {
    lazy_static! {
        static ref URL_RE: Regex =
            Regex::new(r"^https?://[A-Za-z0-9][A-Za-z0-9\-\.]*(:\d{1,5})?([/?#][^\s]*)?$")
                .unwrap();
    }
    URL_RE.is_match(url)
}
