use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::{CloudError, Result};
use crate::model::{Asset, FieldValue, Record, FRUITS_RECORD_TYPE, IMAGE_FIELD, NAME_FIELD};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the transient upload copy inside the cache directory.
pub const UPLOAD_FILENAME: &str = "apple.png";

const BUNDLED_IMAGE: &[u8] = include_bytes!("../../../assets/apple.png");

/// Image attached to every new fruit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SampleImage {
    #[default]
    Bundled,
    File(PathBuf),
}

impl SampleImage {
    pub fn bytes(&self) -> Result<Vec<u8>> {
        match self {
            SampleImage::Bundled => Ok(BUNDLED_IMAGE.to_vec()),
            SampleImage::File(path) => fs::read(path).map_err(CloudError::Io),
        }
    }
}

/// Writes the sample image to the fixed upload path, overwriting any previous copy.
pub fn write_upload_file(image: &SampleImage, cache_dir: &Path) -> Result<PathBuf> {
    let data = image.bytes()?;
    fs::create_dir_all(cache_dir).map_err(CloudError::Io)?;
    let path = cache_dir.join(UPLOAD_FILENAME);
    fs::write(&path, data).map_err(CloudError::Io)?;
    fs::canonicalize(&path).map_err(CloudError::Io)
}

/// Saves a new fruit record with the sample image attached.
///
/// Blank names are ignored. Failures are logged and yield an empty result.
pub fn run<C: Container>(
    container: &mut C,
    name: &str,
    image: &SampleImage,
    cache_dir: &Path,
) -> CmdResult {
    let mut result = CmdResult::default();
    if name.trim().is_empty() {
        return result;
    }

    let mut record = Record::new(FRUITS_RECORD_TYPE);
    record.set(NAME_FIELD, FieldValue::String(name.to_string()));

    let asset = match write_upload_file(image, cache_dir).and_then(|p| Asset::from_path(&p)) {
        Ok(asset) => asset,
        Err(e) => {
            log::error!("Could not prepare image for '{}': {}", name, e);
            return result;
        }
    };
    record.set(IMAGE_FIELD, FieldValue::Asset(asset));

    match container.save_record(&record) {
        Ok(saved) => {
            log::info!("Saved record {}", saved.id);
            result.add_message(CmdMessage::success(format!("Fruit added: {}", name)));
            result.with_affected_records(vec![saved])
        }
        Err(e) => {
            log::error!("Saving '{}' failed: {}", name, e);
            result
        }
    }
}
