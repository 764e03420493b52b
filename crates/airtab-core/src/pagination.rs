//! Multi-page list retrieval.

use std::collections::HashSet;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::Result;
use crate::codec::decode_list;
use crate::error::Error;
use crate::query::Options;
use crate::record::Record;
use crate::schema::RecordShape;
use crate::transport::{Method, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fetching,
    Done,
}

/// Iterator over the pages of a list request.
///
/// Each item is one page of records in the order the service returned them.
/// The iterator owns its own copy of the options, so the caller's value is
/// never touched. After the page without a cursor, or after any error, the
/// iterator is exhausted.
///
/// Created by [`Table::pages`](crate::Table::pages).
pub struct Pages<'t, R> {
    transport: &'t dyn Transport,
    path: String,
    table: &'t str,
    shape: RecordShape,
    options: Options,
    /// Every cursor a page has been requested with; cursors are single-use.
    seen: HashSet<String>,
    state: State,
    _record: PhantomData<fn() -> R>,
}

impl<'t, R: Record> Pages<'t, R> {
    pub(crate) fn new(
        transport: &'t dyn Transport,
        table: &'t str,
        path: String,
        shape: RecordShape,
        options: Options,
    ) -> Self {
        let seen = options.offset.iter().cloned().collect();
        Self {
            transport,
            path,
            table,
            shape,
            options,
            seen,
            state: State::Fetching,
            _record: PhantomData,
        }
    }

    /// Append every remaining page to `out`.
    ///
    /// Records from pages fetched before a failure stay in `out`.
    pub fn collect_into(self, out: &mut Vec<R>) -> Result<()> {
        for page in self {
            out.extend(page?);
        }
        Ok(())
    }

    fn fetch(&mut self) -> Result<Vec<R>> {
        let query = self.options.encode(&self.shape)?;
        trace!(table = self.table, query = %query, "requesting page");

        let bytes = self.transport.request(Method::Get, &self.path, &query, None)?;
        let (records, next) = decode_list::<R>(&bytes, &self.shape)?;

        match next {
            Some(cursor) if self.seen.contains(&cursor) => {
                return Err(Error::RepeatedCursor {
                    table: self.table.to_string(),
                    cursor,
                });
            }
            Some(cursor) => {
                trace!(table = self.table, offset = %cursor, "next page");
                self.seen.insert(cursor.clone());
                self.options.offset = Some(cursor);
            }
            None => {
                debug!(table = self.table, "last page");
                self.state = State::Done;
            }
        }
        Ok(records)
    }
}

impl<R: Record> Iterator for Pages<'_, R> {
    type Item = Result<Vec<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        let page = self.fetch();
        if page.is_err() {
            self.state = State::Done;
        }
        Some(page)
    }
}

impl<R> std::fmt::Debug for Pages<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pages")
            .field("table", &self.table)
            .field("offset", &self.options.offset)
            .field("pages", &self.seen.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    crate::fields! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Item {
            #[wire("Name")]
            name: String,
        }
    }

    /// Replays canned bodies and records the query of every call.
    #[derive(Default)]
    struct Replay {
        bodies: Mutex<VecDeque<Result<Vec<u8>>>>,
        queries: Mutex<Vec<String>>,
    }

    impl Replay {
        fn new(bodies: Vec<Result<&str>>) -> Self {
            Self {
                bodies: Mutex::new(
                    bodies
                        .into_iter()
                        .map(|b| b.map(|s| s.as_bytes().to_vec()))
                        .collect(),
                ),
                queries: Mutex::default(),
            }
        }
    }

    impl Transport for Replay {
        fn request(&self, method: Method, path: &str, query: &str, body: Option<&[u8]>) -> Result<Vec<u8>> {
            assert_eq!(method, Method::Get);
            assert_eq!(path, "Items");
            assert!(body.is_none());
            self.queries.lock().unwrap().push(query.to_string());
            self.bodies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra page request")
        }
    }

    fn pages<'t>(transport: &'t Replay, options: Options) -> Pages<'t, Row<Item>> {
        Pages::new(transport, "Items", "Items".to_string(), Row::<Item>::shape(), options)
    }

    #[test]
    fn follows_cursor_until_exhausted() {
        let transport = Replay::new(vec![
            Ok(r#"{"records":[{"id":"rec1","fields":{"Name":"a"}}],"offset":"itr/rec1"}"#),
            Ok(r#"{"records":[{"id":"rec2","fields":{"Name":"b"}}],"offset":"itr/rec2"}"#),
            Ok(r#"{"records":[{"id":"rec3","fields":{"Name":"c"}}]}"#),
        ]);

        let mut out = Vec::new();
        pages(&transport, Options::new()).collect_into(&mut out).unwrap();

        let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["rec1", "rec2", "rec3"]);
        assert_eq!(
            *transport.queries.lock().unwrap(),
            ["", "offset=itr%2Frec1", "offset=itr%2Frec2"]
        );
    }

    #[test]
    fn caller_options_are_not_mutated() {
        let transport = Replay::new(vec![
            Ok(r#"{"records":[],"offset":"next"}"#),
            Ok(r#"{"records":[]}"#),
        ]);
        let options = Options::new().max_records(10);

        let mut out = Vec::new();
        pages(&transport, options.clone()).collect_into(&mut out).unwrap();
        assert_eq!(options, Options::new().max_records(10));
        assert_eq!(
            *transport.queries.lock().unwrap(),
            ["maxRecords=10", "offset=next&maxRecords=10"]
        );
    }

    #[test]
    fn error_keeps_earlier_pages_and_stops() {
        let transport = Replay::new(vec![
            Ok(r#"{"records":[{"id":"rec1","fields":{}}],"offset":"p2"}"#),
            Err(Error::request("GET", "Items", "SERVER_ERROR")),
        ]);

        let mut iter = pages(&transport, Options::new());
        let mut out = Vec::new();
        let err = iter.by_ref().try_for_each(|page| page.map(|p| out.extend(p))).unwrap_err();

        assert!(err.is_request());
        assert_eq!(out.len(), 1);
        assert!(iter.next().is_none());
    }

    #[test]
    fn bad_page_is_discarded_whole() {
        let transport = Replay::new(vec![
            Ok(r#"{"records":[{"id":"rec1","fields":{}}],"offset":"p2"}"#),
            Ok(r#"{"records":[{"id":"rec2","fields":{}},{"id":"rec3","fields":{"Name":7}}]}"#),
        ]);

        let mut out = Vec::new();
        let err = pages(&transport, Options::new()).collect_into(&mut out).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn repeated_cursor_is_an_error() {
        let transport = Replay::new(vec![
            Ok(r#"{"records":[],"offset":"same"}"#),
            Ok(r#"{"records":[{"id":"rec1","fields":{}}],"offset":"same"}"#),
        ]);

        let mut out = Vec::new();
        let err = pages(&transport, Options::new()).collect_into(&mut out).unwrap_err();
        assert!(matches!(err, Error::RepeatedCursor { ref cursor, .. } if cursor == "same"));
        assert!(out.is_empty());
    }

    /// Answers every request with an empty page whose cursor comes from
    /// `cursor(n)`, `n` counting requests from zero.
    struct Endless<F> {
        cursor: F,
        calls: Mutex<usize>,
    }

    impl<F: Fn(usize) -> Option<String> + Send + Sync> Transport for Endless<F> {
        fn request(&self, _: Method, _: &str, _: &str, _: Option<&[u8]>) -> Result<Vec<u8>> {
            let mut calls = self.calls.lock().unwrap();
            let body = match (self.cursor)(*calls) {
                Some(offset) => serde_json::json!({"records": [], "offset": offset}),
                None => serde_json::json!({"records": []}),
            };
            *calls += 1;
            Ok(serde_json::to_vec(&body).unwrap())
        }
    }

    fn endless_pages<F>(transport: &Endless<F>) -> Pages<'_, Row<Item>>
    where
        F: Fn(usize) -> Option<String> + Send + Sync,
    {
        Pages::new(transport, "Items", "Items".to_string(), Row::<Item>::shape(), Options::new())
    }

    #[test]
    fn cycling_cursors_are_an_error() {
        let transport = Endless {
            cursor: |n: usize| Some(if n % 2 == 0 { "A" } else { "B" }.to_string()),
            calls: Mutex::new(0),
        };

        let results: Vec<_> = endless_pages(&transport).take(500).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok() && results[1].is_ok());
        assert!(matches!(&results[2], Err(Error::RepeatedCursor { cursor, .. }) if cursor == "A"));
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }

    #[test]
    fn fresh_cursors_are_followed_to_the_end() {
        let transport = Endless {
            cursor: |n: usize| (n < 1000).then(|| format!("itr{n}")),
            calls: Mutex::new(0),
        };

        let pages: Vec<_> = endless_pages(&transport).take(2000).collect();
        assert_eq!(pages.len(), 1001);
        assert!(pages.iter().all(Result::is_ok));
    }

    #[test]
    fn unknown_sort_field_fails_before_request() {
        let transport = Replay::new(Vec::new());
        let mut iter = pages(&transport, Options::new().sort("Nope", crate::Direction::Asc));
        assert!(matches!(iter.next(), Some(Err(Error::UnknownField { .. }))));
        assert!(iter.next().is_none());
        assert!(transport.queries.lock().unwrap().is_empty());
    }
}
