//! Best-effort `key=value` extraction from access-log lines
//!
//! The parser is total: any input, including garbled or binary-looking text,
//! yields a [`LogEvent`]. Tokens that do not look like `key=value` are skipped.

use crate::events::LogEvent;

/// Raw `key=value` pairs found in a line, in order of appearance
struct Pairs<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Pairs<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.line;

        while self.pos < line.len() {
            let rest = &line[self.pos..];
            let first = rest.chars().next()?;

            if !is_key_char(first) {
                self.pos += first.len_utf8();
                continue;
            }

            // Key chars are ASCII, so byte offsets and char offsets agree here
            let key_len = rest.find(|c: char| !is_key_char(c)).unwrap_or(rest.len());
            let key = &rest[..key_len];
            let key_end = self.pos + key_len;
            self.pos = key_end;

            if !line[key_end..].starts_with('=') {
                continue;
            }

            let value_start = key_end + 1;
            let after_eq = &line[value_start..];

            if let Some(quoted) = after_eq.strip_prefix('"') {
                if let Some(close) = quoted.find('"') {
                    self.pos = value_start + 1 + close + 1;
                    return Some((key, &quoted[..close]));
                }
                // Unterminated quote: nothing matches at this key
                continue;
            }

            let value_len = after_eq
                .find(|c: char| c == '"' || c.is_whitespace())
                .unwrap_or(after_eq.len());
            if value_len == 0 {
                continue;
            }

            self.pos = value_start + value_len;
            return Some((key, &after_eq[..value_len]));
        }

        None
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parse a raw access-log line into a [`LogEvent`]
///
/// Values are either double-quoted (quotes stripped, no escape handling) or a
/// run of characters that are neither whitespace nor `"`. When a key repeats,
/// the last occurrence wins. `upstream_status` falls back to `status` when the
/// former is missing.
///
/// # Examples
///
/// ```
/// use poolwatch::collectors::parse_line;
///
/// let event = parse_line(r#"pool=blue release="v1 rc" status=502"#);
/// assert_eq!(event.pool.as_deref(), Some("blue"));
/// assert_eq!(event.release.as_deref(), Some("v1 rc"));
/// assert_eq!(event.upstream_status.as_deref(), Some("502"));
/// ```
pub fn parse_line(line: &str) -> LogEvent {
    let mut pool = None;
    let mut release = None;
    let mut upstream_status = None;
    let mut status = None;
    let mut upstream_addr = None;
    let mut request_time = None;
    let mut upstream_response_time = None;

    for (key, value) in Pairs::new(line) {
        let slot = match key {
            "pool" => &mut pool,
            "release" => &mut release,
            "upstream_status" => &mut upstream_status,
            "status" => &mut status,
            "upstream_addr" => &mut upstream_addr,
            "request_time" => &mut request_time,
            "upstream_response_time" => &mut upstream_response_time,
            _ => continue,
        };
        *slot = Some(value);
    }

    LogEvent {
        pool: non_empty(pool),
        release: non_empty(release),
        upstream_status: non_empty(upstream_status).or_else(|| non_empty(status)),
        upstream_addr: non_empty(upstream_addr),
        request_time: non_empty(request_time),
        upstream_response_time: non_empty(upstream_response_time),
        raw: line.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_nginx_line() {
        let line = r#"time=2024-05-01T10:00:00Z pool=blue release="blue-1.4.2" upstream_status=200 upstream_addr=172.18.0.3:3000 request_time=0.012 upstream_response_time=0.010"#;
        let event = parse_line(line);

        assert_eq!(event.pool.as_deref(), Some("blue"));
        assert_eq!(event.release.as_deref(), Some("blue-1.4.2"));
        assert_eq!(event.upstream_status.as_deref(), Some("200"));
        assert_eq!(event.upstream_addr.as_deref(), Some("172.18.0.3:3000"));
        assert_eq!(event.request_time.as_deref(), Some("0.012"));
        assert_eq!(event.upstream_response_time.as_deref(), Some("0.010"));
        assert_eq!(event.raw, line);
    }

    #[test]
    fn test_status_fallback() {
        let event = parse_line("pool=green status=503");
        assert_eq!(event.upstream_status.as_deref(), Some("503"));

        let event = parse_line("status=503 upstream_status=200");
        assert_eq!(event.upstream_status.as_deref(), Some("200"));
    }

    #[test]
    fn test_quoted_value_keeps_spaces() {
        let event = parse_line(r#"release="green 2.0 (canary)" pool=green"#);
        assert_eq!(event.release.as_deref(), Some("green 2.0 (canary)"));
        assert_eq!(event.pool.as_deref(), Some("green"));
    }

    #[test]
    fn test_multiple_upstreams_are_one_token() {
        // nginx reports retried upstreams as a comma list
        let event = parse_line("upstream_status=502,200 upstream_addr=10.0.0.1:80,10.0.0.2:80");
        assert_eq!(event.upstream_status.as_deref(), Some("502,200"));
        assert_eq!(event.upstream_addr.as_deref(), Some("10.0.0.1:80,10.0.0.2:80"));
    }

    #[test]
    fn test_no_matches_yields_all_absent() {
        let event = parse_line("   GET /healthz HTTP/1.1 200   \n");
        assert_eq!(event.pool, None);
        assert_eq!(event.release, None);
        assert_eq!(event.upstream_status, None);
        assert_eq!(event.upstream_addr, None);
        assert_eq!(event.request_time, None);
        assert_eq!(event.upstream_response_time, None);
        assert_eq!(event.raw, "GET /healthz HTTP/1.1 200");
    }

    #[test]
    fn test_empty_line() {
        let event = parse_line("");
        assert_eq!(event, LogEvent::default());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let event = parse_line("pool=blue pool=green");
        assert_eq!(event.pool.as_deref(), Some("green"));
    }

    #[test]
    fn test_key_without_value_is_skipped() {
        let event = parse_line("pool= status=500");
        assert_eq!(event.pool, None);
        assert_eq!(event.upstream_status.as_deref(), Some("500"));
    }

    #[test]
    fn test_empty_quoted_value_is_absent() {
        let event = parse_line(r#"pool="" upstream_status="" status=404"#);
        assert_eq!(event.pool, None);
        assert_eq!(event.upstream_status.as_deref(), Some("404"));
    }

    #[test]
    fn test_unterminated_quote_is_skipped() {
        let event = parse_line(r#"release="broken pool=blue"#);
        assert_eq!(event.release, None);
        assert_eq!(event.pool.as_deref(), Some("blue"));
    }

    #[test]
    fn test_unquoted_value_stops_at_quote() {
        let event = parse_line(r#"pool=blue"green"#);
        assert_eq!(event.pool.as_deref(), Some("blue"));
    }

    #[test]
    fn test_key_is_suffix_after_punctuation() {
        let event = parse_line("x-pool=green nginx.status=502");
        assert_eq!(event.pool.as_deref(), Some("green"));
        assert_eq!(event.upstream_status.as_deref(), Some("502"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let event = parse_line("release=a=b pool=blue");
        assert_eq!(event.release.as_deref(), Some("a=b"));
        assert_eq!(event.pool.as_deref(), Some("blue"));
    }

    #[test]
    fn test_unicode_is_tolerated() {
        let event = parse_line("ü pool=grün release=\"β → γ\" status=500 ✓");
        assert_eq!(event.pool.as_deref(), Some("grün"));
        assert_eq!(event.release.as_deref(), Some("β → γ"));
        assert_eq!(event.upstream_status.as_deref(), Some("500"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let event = parse_line("method=GET path=/ pool=blue");
        assert_eq!(event.pool.as_deref(), Some("blue"));
        assert_eq!(event.upstream_status, None);
    }
}
