use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::model::{FieldValue, FruitItem, NAME_FIELD};

/// Name every updated fruit receives.
pub const PLACEHOLDER_NAME: &str = "NEW NAME";

/// Overwrites the fruit's name with the placeholder and saves it back.
///
/// Failures are logged and yield an empty result.
pub fn run<C: Container>(container: &mut C, item: &FruitItem) -> CmdResult {
    let mut record = item.record.clone();
    record.set(NAME_FIELD, FieldValue::String(PLACEHOLDER_NAME.to_string()));

    let mut result = CmdResult::default();
    match container.save_record(&record) {
        Ok(saved) => {
            log::info!("Updated record {}", saved.id);
            result.add_message(CmdMessage::success(format!(
                "Fruit renamed: {} -> {}",
                item.name, PLACEHOLDER_NAME
            )));
            result.with_affected_records(vec![saved])
        }
        Err(e) => {
            log::error!("Updating record {} failed: {}", item.record.id, e);
            result
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
    fn renames_to_placeholder() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Apple"]);
        let fruits = list::run(&fixture.container, 100).listed_fruits.unwrap();

        let result = run(&mut fixture.container, &fruits[0]);
        assert!(result.is_confirmed());

        let stored = fixture.container.fetch_record(&fruits[0].record.id).unwrap();
        assert_eq!(stored.string(NAME_FIELD), Some(PLACEHOLDER_NAME));
        assert_eq!(stored.created_at, fruits[0].record.created_at);
        assert_eq!(fixture.container.record_count(), 1);
    }

    #[test]
    fn failed_save_keeps_remote_name() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Apple"]);
        let fruits = list::run(&fixture.container, 100).listed_fruits.unwrap();
        fixture.container.fail(Fault::SaveRecord);

        let result = run(&mut fixture.container, &fruits[0]);
        assert!(!result.is_confirmed());

        let stored = fixture.container.fetch_record(&fruits[0].record.id).unwrap();
        assert_eq!(stored.string(NAME_FIELD), Some("Apple"));
    }
}
