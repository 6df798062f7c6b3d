use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use time::{Duration, OffsetDateTime};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Six-digit one-time code used for email verification and password reset.
pub(crate) fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

pub(crate) fn code_expiry() -> OffsetDateTime {
    OffsetDateTime::now_utc() + Duration::minutes(15)
}

/// True when the stored code matches and has not expired.
pub(crate) fn code_matches(
    stored: Option<&str>,
    expires: Option<OffsetDateTime>,
    submitted: &str,
) -> bool {
    match (stored, expires) {
        (Some(code), Some(exp)) => code == submitted && exp > OffsetDateTime::now_utc(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("no@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("two@@example.com"));
    }

    #[test]
    fn generated_code_is_six_digits() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_matches_requires_exact_code_and_future_expiry() {
        let future = OffsetDateTime::now_utc() + Duration::minutes(5);
        let past = OffsetDateTime::now_utc() - Duration::minutes(5);
        assert!(code_matches(Some("123456"), Some(future), "123456"));
        assert!(!code_matches(Some("123456"), Some(future), "654321"));
        assert!(!code_matches(Some("123456"), Some(past), "123456"));
        assert!(!code_matches(None, Some(future), "123456"));
        assert!(!code_matches(Some("123456"), None, "123456"));
    }
}
