//! Lazy iteration over Fineract collection resources.
//!
//! Fineract pages collections with `offset`/`limit` query parameters and
//! answers `{"totalFilteredRecords": n, "pageItems": [...]}`. Some endpoints
//! ignore paging and return a bare array, which is treated as a single final
//! page. A page that repeats the previous one also ends iteration: the
//! server is ignoring `offset`.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::handler::RequestHandler;
use crate::object::Resource;

pub const DEFAULT_PAGE_SIZE: usize = 200;

/// A collection resource, fetched page by page on iteration.
///
/// Nothing is requested until iteration starts. Every call to `iter()`
/// starts again from the first page.
#[derive(Debug, Clone)]
pub struct PaginatedList<T> {
    handler: Arc<RequestHandler>,
    path: String,
    params: Vec<(String, String)>,
    page_size: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T: Resource> PaginatedList<T> {
    pub fn new(handler: &Arc<RequestHandler>, path: &str, params: Vec<(String, String)>) -> Self {
        Self {
            handler: Arc::clone(handler),
            path: path.to_string(),
            params,
            page_size: DEFAULT_PAGE_SIZE,
            _item: PhantomData,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn iter(&self) -> Pages<'_, T> {
        Pages {
            list: self,
            buffer: VecDeque::new(),
            previous: Vec::new(),
            offset: 0,
            done: false,
        }
    }

    /// Fetch every page and collect the items, stopping at the first error.
    pub fn collect_all(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }

    /// The first item, if any, fetched with a one-item page.
    pub fn first(&self) -> Result<Option<T>> {
        let single = PaginatedList::<T> {
            handler: Arc::clone(&self.handler),
            path: self.path.clone(),
            params: self.params.clone(),
            page_size: 1,
            _item: PhantomData,
        };
        single.iter().next().transpose()
    }
}

impl<'a, T: Resource> IntoIterator for &'a PaginatedList<T> {
    type Item = Result<T>;
    type IntoIter = Pages<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator state for one pass over a `PaginatedList`.
pub struct Pages<'a, T> {
    list: &'a PaginatedList<T>,
    buffer: VecDeque<T>,
    /// Raw items of the last page, to spot a server that ignores `offset`.
    previous: Vec<Value>,
    offset: usize,
    done: bool,
}

impl<T: Resource> Pages<'_, T> {
    fn fetch_page(&mut self) -> Result<()> {
        let list = self.list;
        let mut params: Vec<(&str, String)> = list
            .params
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();
        params.push(("offset", self.offset.to_string()));
        params.push(("limit", list.page_size.to_string()));

        let page = list.handler.get(&list.path, &params)?;
        let (items, total) = match &page {
            Value::Array(items) => {
                self.done = true;
                (items.as_slice(), None)
            }
            _ => (
                page.get("pageItems")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
                page.get("totalFilteredRecords").and_then(Value::as_u64),
            ),
        };

        if self.offset > 0 && !items.is_empty() && items == self.previous.as_slice() {
            self.done = true;
            return Ok(());
        }
        self.previous = items.to_vec();

        self.offset += items.len();
        if items.len() < list.page_size
            || total.is_some_and(|total| self.offset as u64 >= total)
        {
            self.done = true;
        }
        self.buffer.extend(
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| T::from_response(&list.handler, item)),
        );
        Ok(())
    }
}

impl<T: Resource> Iterator for Pages<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ApiError;
    use crate::object::Fields;
    use crate::stub::{path_of, query_value, stub_handler, StubReply};

    #[derive(Debug, Clone)]
    struct Item {
        id: Option<i64>,
    }

    impl Resource for Item {
        fn from_response(_handler: &Arc<RequestHandler>, data: &Value) -> Self {
            Self {
                id: Fields::new(data).i64("id"),
            }
        }
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().filter_map(|item| item.id).collect()
    }

    #[test]
    fn nothing_is_fetched_until_iteration() {
        let (handler, recorded) = stub_handler(vec![]);
        let _list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new());
        assert_eq!(recorded.len(), 0);
    }

    #[test]
    fn walks_pages_until_total_is_reached() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(json!({"totalFilteredRecords": 3, "pageItems": [{"id": 1}, {"id": 2}]})),
            StubReply::ok(json!({"totalFilteredRecords": 3, "pageItems": [{"id": 3}]})),
        ]);
        let list = PaginatedList::<Item>::new(
            &handler,
            "/loans",
            vec![("sqlSearch".to_string(), "l.client_id=7".to_string())],
        )
        .with_page_size(2);

        let items = list.collect_all().unwrap();
        assert_eq!(ids(&items), vec![1, 2, 3]);
        assert_eq!(recorded.len(), 2);

        let first = recorded.get(0);
        assert_eq!(path_of(&first), "/loans");
        assert_eq!(query_value(&first, "sqlSearch").as_deref(), Some("l.client_id=7"));
        assert_eq!(query_value(&first, "offset").as_deref(), Some("0"));
        assert_eq!(query_value(&first, "limit").as_deref(), Some("2"));
        assert_eq!(query_value(&recorded.get(1), "offset").as_deref(), Some("2"));
    }

    #[test]
    fn full_page_without_total_fetches_until_empty() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(json!({"pageItems": [{"id": 1}]})),
            StubReply::ok(json!({"pageItems": []})),
        ]);
        let list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new()).with_page_size(1);
        assert_eq!(ids(&list.collect_all().unwrap()), vec![1]);
        assert_eq!(recorded.len(), 2);
    }

    #[test]
    fn repeated_page_ends_iteration() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(json!({"pageItems": [{"id": 1}, {"id": 2}]})),
            StubReply::ok(json!({"pageItems": [{"id": 1}, {"id": 2}]})),
            StubReply::ok(json!({"pageItems": [{"id": 1}, {"id": 2}]})),
        ]);
        let list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new()).with_page_size(2);
        assert_eq!(ids(&list.collect_all().unwrap()), vec![1, 2]);
        assert_eq!(recorded.len(), 2);
    }

    #[test]
    fn bare_array_is_a_single_page() {
        let (handler, recorded) =
            stub_handler(vec![StubReply::ok(json!([{"id": 4}, {"id": 5}]))]);
        let list = PaginatedList::<Item>::new(&handler, "/hooks", Vec::new()).with_page_size(2);
        assert_eq!(ids(&list.collect_all().unwrap()), vec![4, 5]);
        assert_eq!(recorded.len(), 1);
    }

    #[test]
    fn iteration_restarts_from_first_page() {
        let (handler, recorded) = stub_handler(vec![
            StubReply::ok(json!({"totalFilteredRecords": 1, "pageItems": [{"id": 1}]})),
            StubReply::ok(json!({"totalFilteredRecords": 1, "pageItems": [{"id": 1}]})),
        ]);
        let list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new());
        assert_eq!(list.iter().count(), 1);
        assert_eq!(list.iter().count(), 1);
        assert_eq!(query_value(&recorded.get(1), "offset").as_deref(), Some("0"));
    }

    #[test]
    fn error_ends_iteration() {
        let (handler, _) = stub_handler(vec![StubReply::status(500, "boom")]);
        let list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new());
        let mut iter = list.iter();
        assert!(matches!(iter.next(), Some(Err(ApiError::HttpError { status: 500, .. }))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn first_uses_single_item_page() {
        let (handler, recorded) = stub_handler(vec![StubReply::ok(
            json!({"totalFilteredRecords": 9, "pageItems": [{"id": 8}]}),
        )]);
        let list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new());
        let first = list.first().unwrap().unwrap();
        assert_eq!(first.id, Some(8));
        assert_eq!(query_value(&recorded.last(), "limit").as_deref(), Some("1"));
    }

    #[test]
    fn first_of_empty_collection_is_none() {
        let (handler, _) =
            stub_handler(vec![StubReply::ok(json!({"totalFilteredRecords": 0, "pageItems": []}))]);
        let list = PaginatedList::<Item>::new(&handler, "/clients", Vec::new());
        assert!(list.first().unwrap().is_none());
    }
}
