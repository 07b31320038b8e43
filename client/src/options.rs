//! Mapping of option values to URL query parameters and HTTP headers.
//!
//! Each options type declares, field by field, where its values go by implementing
//! [`QueryOptions`] and/or [`HeaderOptions`].  Fields built with [`OptionField::omit_empty`],
//! [`OptionField::omit_zero`] or [`OptionField::optional`] disappear from the encoding when
//! they carry no value.
use crate::util::urlencode;
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

/// A single option field: a query or header key, and its value if it is to be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionField {
    key: String,
    value: Option<String>,
}

impl OptionField {
    /// A field that is always emitted, even when empty.  An empty query value encodes as
    /// `key=`.
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: Some(value.to_string()),
        }
    }

    /// A field that is omitted when `value` is the empty string.
    pub fn omit_empty(key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        Self {
            key: key.into(),
            value: (!value.is_empty()).then(|| value.to_owned()),
        }
    }

    /// A numeric field that is omitted when `value` is zero.
    pub fn omit_zero(key: impl Into<String>, value: impl Into<u64>) -> Self {
        let value = value.into();
        Self {
            key: key.into(),
            value: (value != 0).then(|| value.to_string()),
        }
    }

    /// A field that is omitted when `value` is `None`.
    pub fn optional<V: ToString>(key: impl Into<String>, value: Option<V>) -> Self {
        Self {
            key: key.into(),
            value: value.map(|v| v.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value to emit, or `None` if this field is omitted.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Options that are sent as URL query parameters.
pub trait QueryOptions: Sync {
    /// The query fields, in the order they should appear in the query string.
    fn query_fields(&self) -> Vec<OptionField>;
}

/// Options that are sent as HTTP headers.
pub trait HeaderOptions: Sync {
    fn header_fields(&self) -> Vec<OptionField>;
}

/// Encode the emitted fields of `opt` as `key=value` pairs joined with `&`.
pub fn encode_query(opt: &dyn QueryOptions) -> String {
    opt.query_fields()
        .iter()
        .filter_map(|f| f.value().map(|v| format!("{}={}", urlencode(f.key()), urlencode(v))))
        .collect::<Vec<_>>()
        .join("&")
}

/// Add the parameters in `opt` to the query of `url`.
///
/// Any query already present on `url` stays first: the service routes on the first query
/// parameter (e.g. `?acl`, `?uploads`), so encoded options must never precede it.
pub fn add_url_options(url: &mut Url, opt: Option<&dyn QueryOptions>) {
    let opt = match opt {
        Some(opt) => opt,
        None => return,
    };
    let encoded = encode_query(opt);
    if encoded.is_empty() {
        return;
    }
    let query = match url.query() {
        Some(q) if !q.is_empty() => format!("{}&{}", q, encoded),
        _ => encoded,
    };
    url.set_query(Some(&query));
}

/// Add the fields in `opt` to `headers`.  Values are appended, so headers already present
/// are kept.
pub fn add_header_options(headers: &mut HeaderMap, opt: Option<&dyn HeaderOptions>) -> Result<()> {
    let opt = match opt {
        Some(opt) => opt,
        None => return Ok(()),
    };
    for field in opt.header_fields() {
        let value = match field.value() {
            Some(v) => v,
            None => continue,
        };
        let invalid = || Error::InvalidHeader {
            name: field.key().to_owned(),
        };
        let name = HeaderName::from_bytes(field.key().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.append(name, value);
    }
    Ok(())
}
