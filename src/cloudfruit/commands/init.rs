use crate::commands::{CloudPaths, CmdMessage, CmdResult};
use crate::container::fs::{AccountProfile, FileContainer};
use crate::error::Result;
use std::fs;

/// Sets up the file-backed container with a signed-in account.
///
/// An existing account is kept unless `given_name` asks for a change.
pub fn run(paths: &CloudPaths, given_name: Option<String>) -> Result<CmdResult> {
    let container = FileContainer::new(paths.container.clone());
    fs::create_dir_all(&paths.cache)?;

    let mut result = CmdResult::default();
    match container.load_account()? {
        Some(mut profile) => {
            if let Some(given) = given_name {
                let mut components = profile.name_components.unwrap_or_default();
                components.given_name = Some(given);
                profile.name_components = Some(components);
            }
            container.initialize(&profile)?;
            result.add_message(CmdMessage::info(format!(
                "Container already initialized at {}",
                paths.container.display()
            )));
        }
        None => {
            container.initialize(&AccountProfile::signed_in(given_name))?;
            result.add_message(CmdMessage::success(format!(
                "Initialized container at {}",
                paths.container.display()
            )));
        }
    }
    Ok(result)
}
