use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::{CloudError, Result};
use crate::model::FruitItem;

/// Deletes the fruit at `index` remotely, then drops it from `fruits`.
///
/// The record id is captured before the remote call and the local entry is
/// removed by id once the service confirms, so a list that changed meanwhile
/// loses the right entry. A failed remote delete is logged and leaves `fruits`
/// untouched.
pub fn run<C: Container>(
    container: &mut C,
    fruits: &mut Vec<FruitItem>,
    index: usize,
) -> Result<CmdResult> {
    let item = fruits
        .get(index)
        .ok_or_else(|| CloudError::Api(format!("No fruit at index {}", index)))?;
    let id = item.record.id.clone();
    let name = item.name.clone();

    let mut result = CmdResult::default();
    match container.delete_record(&id) {
        Ok(deleted) => {
            log::info!("Deleted record {}", deleted);
            let removed: Vec<_> = fruits
                .iter()
                .filter(|f| f.record.id == deleted)
                .map(|f| f.record.clone())
                .collect();
            fruits.retain(|f| f.record.id != deleted);
            result.add_message(CmdMessage::success(format!("Fruit deleted: {}", name)));
            Ok(result.with_affected_records(removed))
        }
        Err(e) => {
            log::error!("Deleting record {} failed: {}", id, e);
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::list;
    use crate::container::memory::fixtures::ContainerFixture;
    use crate::container::memory::Fault;

    #[test]
    fn removes_remote_and_local_entry() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Apple", "Banana"]);
        let mut fruits = list::run(&fixture.container, 100).listed_fruits.unwrap();

        let result = run(&mut fixture.container, &mut fruits, 0).unwrap();
        assert!(result.is_confirmed());
        assert_eq!(fruits.len(), 1);
        assert_eq!(fruits[0].name, "Apple");
        assert_eq!(fixture.container.record_count(), 1);
    }

    #[test]
    fn failed_delete_keeps_local_list() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Apple", "Banana"]);
        let mut fruits = list::run(&fixture.container, 100).listed_fruits.unwrap();
        let before = fruits.clone();
        fixture.container.fail(Fault::DeleteRecord);

        let result = run(&mut fixture.container, &mut fruits, 1).unwrap();
        assert!(!result.is_confirmed());
        assert_eq!(fruits, before);
        assert_eq!(fixture.container.record_count(), 2);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Apple"]);
        let mut fruits = list::run(&fixture.container, 100).listed_fruits.unwrap();

        match run(&mut fixture.container, &mut fruits, 3) {
            Err(CloudError::Api(msg)) => assert_eq!(msg, "No fruit at index 3"),
            other => panic!("expected an API error, got {:?}", other.map(|r| r.messages)),
        }
        assert_eq!(fruits.len(), 1);
    }

    #[test]
    fn record_already_gone_remotely_keeps_local_entry() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Apple"]);
        let mut fruits = list::run(&fixture.container, 100).listed_fruits.unwrap();
        let mut stale = fruits.clone();
        run(&mut fixture.container, &mut fruits, 0).unwrap();

        let result = run(&mut fixture.container, &mut stale, 0).unwrap();
        assert!(!result.is_confirmed());
        assert_eq!(stale.len(), 1);
    }
}
