//! # Queries
//!
//! A [`QueryOperation`] selects records of one type that match a [`Predicate`],
//! orders them by a list of [`SortDescriptor`]s and returns one page of at most
//! `results_limit` records. When more records remain, the operation completes
//! with a [`QueryCursor`] that a follow-up operation can resume from.
//!
//! Results are pushed into a [`QueryResultSink`]: one `record_matched` call per
//! record, then exactly one `query_completed` call. Containers share the
//! matching, ordering and paging rules through [`evaluate`].

use crate::error::Result;
use crate::model::{FieldValue, Record, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort key resolved against the record's server-assigned creation time.
pub const CREATION_DATE_KEY: &str = "creationDate";

pub const DEFAULT_RESULTS_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    All,
    FieldEquals { field: String, value: String },
}

impl Predicate {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::FieldEquals { field, value } => record.string(field) == Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub key: String,
    pub ascending: bool,
}

impl SortDescriptor {
    pub fn new(key: impl Into<String>, ascending: bool) -> Self {
        Self {
            key: key.into(),
            ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub record_type: String,
    pub predicate: Predicate,
    pub sort_descriptors: Vec<SortDescriptor>,
}

impl Query {
    pub fn new(record_type: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            record_type: record_type.into(),
            predicate,
            sort_descriptors: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, descriptor: SortDescriptor) -> Self {
        self.sort_descriptors.push(descriptor);
        self
    }
}

/// Position after the last record of a returned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCursor {
    offset: usize,
}

impl QueryCursor {
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[derive(Debug, Clone)]
pub struct QueryOperation {
    pub query: Query,
    pub cursor: Option<QueryCursor>,
    pub results_limit: usize,
}

impl QueryOperation {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            cursor: None,
            results_limit: DEFAULT_RESULTS_LIMIT,
        }
    }

    pub fn with_results_limit(mut self, limit: usize) -> Self {
        self.results_limit = limit.max(1);
        self
    }

    pub fn resuming(mut self, cursor: QueryCursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Receiver for the events of one query operation.
pub trait QueryResultSink {
    /// Called once per matched record. A record-level failure does not end the query.
    fn record_matched(&mut self, id: &RecordId, result: Result<Record>);

    /// Called once after the last matched record.
    fn query_completed(&mut self, result: Result<Option<QueryCursor>>);
}

/// One page of a query, before delivery to a sink.
#[derive(Debug, Default)]
pub struct QueryPage<T> {
    pub matches: Vec<T>,
    pub cursor: Option<QueryCursor>,
}

/// Applies type, predicate, ordering and paging to a set of candidates.
///
/// `record_of` projects each candidate to the record it describes; candidates
/// are returned untouched so containers can carry per-record load failures.
pub fn evaluate<T, F>(operation: &QueryOperation, candidates: Vec<T>, record_of: F) -> QueryPage<T>
where
    F: Fn(&T) -> &Record,
{
    let query = &operation.query;
    let mut matched: Vec<T> = candidates
        .into_iter()
        .filter(|c| {
            let record = record_of(c);
            record.record_type == query.record_type && query.predicate.matches(record)
        })
        .collect();

    matched.sort_by(|a, b| compare(record_of(a), record_of(b), &query.sort_descriptors));

    let offset = operation.cursor.map(|c| c.offset).unwrap_or(0);
    let end = offset.saturating_add(operation.results_limit);
    let cursor = if matched.len() > end {
        Some(QueryCursor { offset: end })
    } else {
        None
    };

    let matches = matched.into_iter().skip(offset).take(operation.results_limit).collect();
    QueryPage { matches, cursor }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue<'a> {
    Time(DateTime<Utc>),
    Text(&'a str),
}

fn sort_value<'a>(record: &'a Record, key: &str) -> Option<SortValue<'a>> {
    match key {
        CREATION_DATE_KEY => record.created_at.map(SortValue::Time),
        _ => match record.get(key)? {
            FieldValue::String(s) => Some(SortValue::Text(s)),
            FieldValue::Asset(_) => None,
        },
    }
}

fn compare(a: &Record, b: &Record, descriptors: &[SortDescriptor]) -> Ordering {
    for descriptor in descriptors {
        // Missing values sort last in both directions.
        let ordering = match (sort_value(a, &descriptor.key), sort_value(b, &descriptor.key)) {
            (Some(x), Some(y)) if descriptor.ascending => x.cmp(&y),
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
