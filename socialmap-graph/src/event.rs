use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// mf2 class assigned to links that carry no semantic class
pub const DEFAULT_MF2_CLASS: &str = "other";

/// One aggregated row of link data: `count` links from one domain to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEvent {
    pub from_domain: String,
    pub to_domain: String,
    pub count: u64,
    pub mf2_class: String,
}

/// Wire shape of a link record before required fields are checked
#[derive(Debug, Deserialize)]
struct RawLinkRecord {
    from_domain: Option<String>,
    to_domain: Option<String>,
    num: Option<Value>,
    mf2_class: Option<String>,
}

impl LinkEvent {
    pub fn new(from_domain: impl Into<String>, to_domain: impl Into<String>, count: u64) -> Self {
        Self {
            from_domain: from_domain.into(),
            to_domain: to_domain.into(),
            count,
            mf2_class: DEFAULT_MF2_CLASS.to_string(),
        }
    }

    pub fn with_mf2_class(mut self, mf2_class: &str) -> Self {
        self.mf2_class = normalize_mf2_class(mf2_class);
        self
    }

    /// Build an event from a JSON link record.
    ///
    /// `index` is the record's position in its input stream and is only used
    /// for error reporting. `from_domain`, `to_domain` and `num` are required;
    /// `num` may be a JSON integer or a numeric string.
    pub fn from_record(index: usize, record: Value) -> Result<Self> {
        let raw: RawLinkRecord = serde_json::from_value(record)?;

        let from_domain = raw.from_domain.ok_or(GraphError::MissingField {
            index,
            field: "from_domain",
        })?;
        let to_domain = raw.to_domain.ok_or(GraphError::MissingField {
            index,
            field: "to_domain",
        })?;
        let num = raw.num.ok_or(GraphError::MissingField { index, field: "num" })?;
        let count = parse_count(&num).ok_or_else(|| GraphError::InvalidCount {
            index,
            value: num.to_string(),
        })?;

        let event = Self::new(from_domain, to_domain, count);
        Ok(match raw.mf2_class {
            Some(class) => event.with_mf2_class(&class),
            None => event,
        })
    }
}

/// Strip the `u-` property prefix some producers leave on class names
pub fn normalize_mf2_class(class: &str) -> String {
    class.strip_prefix("u-").unwrap_or(class).to_string()
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_defaults_class() {
        let event = LinkEvent::from_record(
            0,
            json!({"from_domain": "a.com", "to_domain": "b.com", "num": 4}),
        )
        .unwrap();

        assert_eq!(event.from_domain, "a.com");
        assert_eq!(event.to_domain, "b.com");
        assert_eq!(event.count, 4);
        assert_eq!(event.mf2_class, "other");
    }

    #[test]
    fn test_from_record_strips_u_prefix() {
        let event = LinkEvent::from_record(
            0,
            json!({"from_domain": "a.com", "to_domain": "b.com", "num": 1, "mf2_class": "u-like-of"}),
        )
        .unwrap();

        assert_eq!(event.mf2_class, "like-of");
    }

    #[test]
    fn test_from_record_accepts_string_count() {
        let event = LinkEvent::from_record(
            0,
            json!({"from_domain": "a.com", "to_domain": "b.com", "num": "12"}),
        )
        .unwrap();

        assert_eq!(event.count, 12);
    }

    #[test]
    fn test_from_record_missing_fields() {
        let err = LinkEvent::from_record(7, json!({"to_domain": "b.com", "num": 1})).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingField { index: 7, field: "from_domain" }
        ));

        let err = LinkEvent::from_record(0, json!({"from_domain": "a.com", "num": 1})).unwrap_err();
        assert!(matches!(err, GraphError::MissingField { field: "to_domain", .. }));

        let err =
            LinkEvent::from_record(0, json!({"from_domain": "a.com", "to_domain": "b.com"}))
                .unwrap_err();
        assert!(matches!(err, GraphError::MissingField { field: "num", .. }));
    }

    #[test]
    fn test_from_record_rejects_negative_count() {
        let err = LinkEvent::from_record(
            3,
            json!({"from_domain": "a.com", "to_domain": "b.com", "num": -2}),
        )
        .unwrap_err();

        assert!(matches!(err, GraphError::InvalidCount { index: 3, .. }));
    }

    #[test]
    fn test_normalize_mf2_class_leaves_plain_names() {
        assert_eq!(normalize_mf2_class("in-reply-to"), "in-reply-to");
        assert_eq!(normalize_mf2_class("u-repost-of"), "repost-of");
    }
}
