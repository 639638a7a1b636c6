//! `Retry-After` handling for throttled and unavailable responses.
//!
//! When Yuque answers 429 or 503 it may say how long to back off. The
//! transport prefers that hint over its own exponential schedule.

use http::{HeaderMap, StatusCode};
use std::time::{Duration, SystemTime};

/// Returns the server-requested delay for a failed attempt, capped at `max_wait`.
///
/// Only 429 and 503 responses are considered.
pub fn server_delay(status: StatusCode, headers: &HeaderMap, max_wait: Duration) -> Option<Duration> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    parse_retry_after(headers).map(|delay| delay.min(max_wait))
}

/// Parses the Retry-After header.
///
/// Supports both delay-seconds (integer) and HTTP-date formats. A date in the
/// past yields no delay hint.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    date_time.duration_since(SystemTime::now()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn with_retry_after(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let headers = with_retry_after("60");
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let future = SystemTime::now() + Duration::from_secs(120);
        let headers = with_retry_after(&httpdate::fmt_http_date(future));

        let delay = parse_retry_after(&headers).unwrap();
        assert!(delay > Duration::from_secs(100) && delay <= Duration::from_secs(120));
    }

    #[test]
    fn test_past_date_gives_no_hint() {
        let headers = with_retry_after("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_garbage_is_ignored() {
        let headers = with_retry_after("soon");
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_server_delay_only_for_throttling_statuses() {
        let headers = with_retry_after("5");
        let cap = Duration::from_secs(30);

        assert_eq!(
            server_delay(StatusCode::TOO_MANY_REQUESTS, &headers, cap),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            server_delay(StatusCode::SERVICE_UNAVAILABLE, &headers, cap),
            Some(Duration::from_secs(5))
        );
        assert_eq!(server_delay(StatusCode::BAD_GATEWAY, &headers, cap), None);
    }

    #[test]
    fn test_server_delay_capped() {
        let headers = with_retry_after("600");
        assert_eq!(
            server_delay(StatusCode::TOO_MANY_REQUESTS, &headers, Duration::from_secs(2)),
            Some(Duration::from_secs(2))
        );
    }
}
