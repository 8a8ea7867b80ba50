use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;
use crate::model::{FruitItem, Record, RecordId, FRUITS_RECORD_TYPE};
use crate::query::{
    Predicate, Query, QueryCursor, QueryOperation, QueryResultSink, SortDescriptor,
    CREATION_DATE_KEY,
};

/// Collects the fruits of one query.
///
/// Records without a name, and records the service could not deliver, are
/// logged and skipped.
#[derive(Debug, Default)]
pub struct FruitAccumulator {
    items: Vec<FruitItem>,
    completion: Option<Result<Option<QueryCursor>>>,
}

impl FruitAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected page, once the query completed successfully.
    pub fn finish(self) -> Option<(Vec<FruitItem>, Option<QueryCursor>)> {
        match self.completion {
            Some(Ok(cursor)) => Some((self.items, cursor)),
            Some(Err(e)) => {
                log::error!("Fruit query failed: {}", e);
                None
            }
            None => {
                log::error!("Fruit query never completed");
                None
            }
        }
    }
}

impl QueryResultSink for FruitAccumulator {
    fn record_matched(&mut self, id: &RecordId, result: Result<Record>) {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::error!("Record {} could not be fetched: {}", id, e);
                return;
            }
        };
        match FruitItem::from_record(record) {
            Ok(item) => {
                log::debug!("Matched fruit {} ({})", item.name, id);
                self.items.push(item);
            }
            Err(e) => log::warn!("Skipping record {}: {}", id, e),
        }
    }

    fn query_completed(&mut self, result: Result<Option<QueryCursor>>) {
        self.completion = Some(result);
    }
}

/// Newest fruits first.
pub fn fruits_query() -> Query {
    Query::new(FRUITS_RECORD_TYPE, Predicate::All)
        .sorted_by(SortDescriptor::new(CREATION_DATE_KEY, false))
}

/// Fetches the first page of fruits.
///
/// `listed_fruits` is `None` if the query failed.
pub fn run<C: Container>(container: &C, results_limit: usize) -> CmdResult {
    let operation = QueryOperation::new(fruits_query()).with_results_limit(results_limit);
    let mut sink = FruitAccumulator::new();
    container.add_query_operation(&operation, &mut sink);

    let Some((items, cursor)) = sink.finish() else {
        return CmdResult::default();
    };

    let mut result = CmdResult::default().with_listed_fruits(items);
    if cursor.is_some() {
        result.add_message(CmdMessage::info(format!(
            "Showing the first {} fruits; more are stored.",
            results_limit
        )));
    }
    result
}
