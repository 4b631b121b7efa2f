use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A parameter destined for a `$n` placeholder. Caller input only ever reaches
/// the store through one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

/// How the raw query-string value of an allow-listed filter is typed before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Integer,
    Boolean,
    Uuid,
    Timestamp,
}

impl FilterKind {
    /// `None` means the value does not fit the column and the filter is dropped.
    pub fn parse(&self, raw: &str) -> Option<BindValue> {
        match self {
            FilterKind::Text => Some(BindValue::Text(raw.to_string())),
            FilterKind::Integer => raw.trim().parse().ok().map(BindValue::Integer),
            FilterKind::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "1" => Some(BindValue::Boolean(true)),
                "false" | "0" => Some(BindValue::Boolean(false)),
                _ => None,
            },
            FilterKind::Uuid => raw.trim().parse().ok().map(BindValue::Uuid),
            FilterKind::Timestamp => DateTime::parse_from_rfc3339(raw.trim())
                .ok()
                .map(|ts| BindValue::Timestamp(ts.with_timezone(&Utc))),
        }
    }
}

/// Pushes a value and returns its 1-based placeholder index.
pub(super) fn push_bind(binds: &mut Vec<BindValue>, value: BindValue) -> usize {
    binds.push(value);
    binds.len()
}

/// Escapes `LIKE` metacharacters so a search term always matches literally.
pub(super) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Integer(v) => query.bind(v),
                BindValue::Boolean(v) => query.bind(v),
                BindValue::Uuid(v) => query.bind(v),
                BindValue::Timestamp(v) => query.bind(v),
            };
        }
        query
    }};
}

pub(super) use bind_values;

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(FilterKind::Text, " admin ", Some(BindValue::Text(" admin ".to_string())))]
    #[case(FilterKind::Integer, "42", Some(BindValue::Integer(42)))]
    #[case(FilterKind::Integer, "4x2", None)]
    #[case(FilterKind::Boolean, "TRUE", Some(BindValue::Boolean(true)))]
    #[case(FilterKind::Boolean, "0", Some(BindValue::Boolean(false)))]
    #[case(FilterKind::Boolean, "maybe", None)]
    #[case(FilterKind::Uuid, "not-a-uuid", None)]
    #[case(FilterKind::Timestamp, "yesterday", None)]
    fn test_filter_kind_parse(
        #[case] kind: FilterKind,
        #[case] raw: &str,
        #[case] expected: Option<BindValue>,
    ) {
        assert_eq!(kind.parse(raw), expected);
    }

    #[rstest]
    fn test_filter_kind_parse_timestamp_normalizes_to_utc() {
        let parsed = FilterKind::Timestamp.parse("2024-03-01T12:00:00+02:00");
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parsed, Some(BindValue::Timestamp(expected)));
    }

    #[rstest]
    #[case("john", "john")]
    #[case("50%", "50\\%")]
    #[case("jo_hn", "jo\\_hn")]
    #[case("a\\b", "a\\\\b")]
    fn test_escape_like(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(escape_like(term), expected);
    }

    #[rstest]
    fn test_push_bind_returns_placeholder_index() {
        let mut binds = Vec::new();
        assert_eq!(push_bind(&mut binds, BindValue::Boolean(false)), 1);
        assert_eq!(push_bind(&mut binds, BindValue::Integer(7)), 2);
    }
}
