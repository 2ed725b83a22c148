//! URL assembly: template variable substitution and query encoding.

use std::fmt;

use crate::error::ClientError;

/// A query parameter value, formatted without quoting.
///
/// Falsy values (`0`, empty string, `false`) are legitimate and encoded
/// as-is; omission is expressed by `Option::None` at the call site, never
/// inferred from the value itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QueryValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) => f.write_str(s),
            QueryValue::Int(i) => write!(f, "{i}"),
            QueryValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

/// Substitute `{placeholder}` variables in an endpoint template.
///
/// Entries with a `None` value are treated as not supplied. Every
/// placeholder in the template must resolve; `endpoint` only labels the
/// error.
pub(crate) fn fill_template(
    endpoint: &str,
    template: &str,
    vars: &[(&str, Option<&str>)],
) -> Result<String, ClientError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (before, after_open) = rest.split_at(open);
        out.push_str(before);
        let Some(close) = after_open.find('}') else {
            return Err(ClientError::MissingPathVariable {
                endpoint: endpoint.to_owned(),
                variable: after_open[1..].to_owned(),
            });
        };
        let name = &after_open[1..close];
        let value = vars
            .iter()
            .find_map(|(k, v)| if *k == name { v.as_deref() } else { None });
        match value {
            Some(value) => out.push_str(value),
            None => {
                return Err(ClientError::MissingPathVariable {
                    endpoint: endpoint.to_owned(),
                    variable: name.to_owned(),
                });
            }
        }
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Append percent-encoded query parameters in the order given, skipping
/// absent values. No `?` is appended when every value is absent.
pub(crate) fn append_query(url: &mut String, params: &[(&str, Option<QueryValue>)]) {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in params {
        if let Some(value) = value {
            serializer.append_pair(name, &value.to_string());
            any = true;
        }
    }
    if any {
        url.push('?');
        url.push_str(&serializer.finish());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_all_placeholders() {
        let url = fill_template(
            "apps__item",
            "/v2/users/{user_id}/apps/{app_id}",
            &[("user_id", Some("u1")), ("app_id", Some("a1"))],
        )
        .unwrap();
        assert_eq!(url, "/v2/users/u1/apps/a1");
    }

    #[test]
    fn absent_variable_names_endpoint_and_placeholder() {
        let err = fill_template(
            "apps__item",
            "/v2/users/{user_id}/apps/{app_id}",
            &[("user_id", Some("u1")), ("app_id", None)],
        )
        .unwrap_err();
        match err {
            ClientError::MissingPathVariable { endpoint, variable } => {
                assert_eq!(endpoint, "apps__item");
                assert_eq!(variable, "app_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn template_without_placeholders_passes_through() {
        let url = fill_template("models__searches", "/v2/models/searches", &[]).unwrap();
        assert_eq!(url, "/v2/models/searches");
    }

    #[test]
    fn query_preserves_insertion_order_and_skips_absent() {
        let mut url = String::from("/v2/x");
        append_query(
            &mut url,
            &[
                ("page", Some(QueryValue::from(2u32))),
                ("per_page", None),
                ("last_id", Some(QueryValue::from("in-9"))),
            ],
        );
        assert_eq!(url, "/v2/x?page=2&last_id=in-9");
    }

    #[test]
    fn falsy_values_are_encoded_not_dropped() {
        let mut url = String::from("/v2/x");
        append_query(
            &mut url,
            &[
                ("page", Some(QueryValue::from(0u32))),
                ("q", Some(QueryValue::from(""))),
                ("flag", Some(QueryValue::from(false))),
            ],
        );
        assert_eq!(url, "/v2/x?page=0&q=&flag=false");
    }

    #[test]
    fn all_absent_appends_nothing() {
        let mut url = String::from("/v2/x");
        append_query(&mut url, &[("page", None), ("per_page", None)]);
        assert_eq!(url, "/v2/x");
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let mut url = String::from("/v2/x");
        append_query(
            &mut url,
            &[("start_date", Some(QueryValue::from("2026-08-01 00:00:00")))],
        );
        assert_eq!(url, "/v2/x?start_date=2026-08-01+00%3A00%3A00");
    }
}
