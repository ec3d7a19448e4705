use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::InstanceData;

/// Read a JSON instance payload (`n`, `E`, `cost`, `utility`, `T`, `C`)
pub fn read_instance(path: &Path) -> Result<InstanceData> {
    let reader = super::open(path)?;
    serde_json::from_reader(reader).with_context(|| format!("invalid instance file {}", path.display()))
}
