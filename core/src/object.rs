//! JSON-to-entity mapping base.
//!
//! # Design
//! Every entity field is an `Option`; `None` is the "absent" sentinel. Each
//! entity reads its fields one by one through `Fields`, which never fails:
//! a missing key, a `null`, or a value of the wrong JSON type all come back
//! as `None`. Nested resources go through `make_object` (one) or
//! `make_objects_list` (many), parameterised by the target's own `FromJson`.
//!
//! Fineract encodes dates as `[year, month, day]` arrays, optionally followed
//! by `hour, minute, second` (and nanos for some timestamp columns).

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;

/// Date pattern sent alongside every date-valued request field.
pub const DATE_FORMAT: &str = "dd MMMM yyyy";
pub const LOCALE: &str = "en";

/// A value object built purely from JSON.
pub trait FromJson: Sized {
    fn from_json(data: &Value) -> Self;
}

/// An entity that keeps the handler it was fetched with so it can issue
/// follow-up requests.
pub trait Resource: Sized {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self;
}

/// Typed, infallible accessors over a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    data: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            data: data.as_object(),
        }
    }

    /// The raw value under `key`, treating `null` as absent.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.data?.get(key).filter(|value| !value.is_null())
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.raw(key)?.as_i64()
    }

    pub fn i32(&self, key: &str) -> Option<i32> {
        self.i64(key).and_then(|n| i32::try_from(n).ok())
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.raw(key)?.as_f64()
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.raw(key)?.as_bool()
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.raw(key)?.as_str().map(str::to_string)
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.raw(key).and_then(make_date)
    }

    pub fn datetime(&self, key: &str) -> Option<NaiveDateTime> {
        self.raw(key).and_then(make_datetime)
    }

    pub fn object<T: FromJson>(&self, key: &str) -> Option<T> {
        make_object(self.raw(key))
    }

    pub fn list<T: FromJson>(&self, key: &str) -> Option<Vec<T>> {
        make_objects_list(self.raw(key))
    }
}

/// Build a nested value object; anything but a JSON object yields `None`.
pub fn make_object<T: FromJson>(value: Option<&Value>) -> Option<T> {
    value.filter(|v| v.is_object()).map(T::from_json)
}

/// Build a list of nested value objects in server order.
///
/// Non-object elements are skipped; a non-array input yields `None`.
pub fn make_objects_list<T: FromJson>(value: Option<&Value>) -> Option<Vec<T>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter(|item| item.is_object())
            .map(T::from_json)
            .collect(),
    )
}

/// Build a list of handler-bound entities from a JSON array.
pub fn make_resources<T: Resource>(handler: &Arc<RequestHandler>, value: &Value) -> Vec<T> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| T::from_response(handler, item))
                .collect()
        })
        .unwrap_or_default()
}

fn date_parts(value: &Value) -> Option<Vec<u32>> {
    let parts = value.as_array()?;
    if !(3..=7).contains(&parts.len()) {
        return None;
    }
    parts
        .iter()
        .map(|part| part.as_u64().and_then(|n| u32::try_from(n).ok()))
        .collect()
}

/// Parse a Fineract date. Also accepts an ISO `YYYY-MM-DD` string.
pub fn make_date(value: &Value) -> Option<NaiveDate> {
    if let Some(text) = value.as_str() {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    }
    let parts = date_parts(value)?;
    NaiveDate::from_ymd_opt(i32::try_from(parts[0]).ok()?, parts[1], parts[2])
}

/// Parse a Fineract timestamp; a bare date means midnight.
pub fn make_datetime(value: &Value) -> Option<NaiveDateTime> {
    if value.is_string() {
        return make_date(value).and_then(|date| date.and_hms_opt(0, 0, 0));
    }
    let parts = date_parts(value)?;
    let date = NaiveDate::from_ymd_opt(i32::try_from(parts[0]).ok()?, parts[1], parts[2])?;
    let at = |i: usize| parts.get(i).copied().unwrap_or(0);
    date.and_hms_opt(at(3), at(4), at(5))
}

/// Today on the caller's clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Render a date the way `DATE_FORMAT` describes it, e.g. `05 March 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

/// A request body holding one date field (today when `date` is `None`)
/// together with the `dateFormat` and `locale` keys Fineract needs to read
/// it.
pub fn dated_body(field: &str, date: Option<NaiveDate>) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(
        field.to_string(),
        Value::String(format_date(date.unwrap_or_else(today))),
    );
    body.insert("dateFormat".to_string(), Value::String(DATE_FORMAT.to_string()));
    body.insert("locale".to_string(), Value::String(LOCALE.to_string()));
    body
}

pub(crate) fn require_id(id: Option<i64>) -> Result<i64> {
    id.ok_or(ApiError::IdNotSet)
}

/// `value` percent-encoded as a single URL path segment, so `/`, `?` and
/// `#` inside a caller-supplied name cannot reshape the request URL.
pub(crate) fn path_segment(value: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment/") else {
        return value.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(value);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Whether a command response echoes `id` under `key`.
pub(crate) fn echoes_id(response: &Value, key: &str, id: i64) -> bool {
    response.get(key).and_then(Value::as_i64) == Some(id)
}
