//! File inputs: arc lists, vertex weights, layout coordinates and JSON
//! instance payloads.

pub mod coordinates;
pub mod graph_csv;
pub mod instance;
pub mod weights;

pub use coordinates::*;
pub use graph_csv::*;
pub use instance::*;
pub use weights::*;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Split a comma separated line into exactly `N` trimmed fields
fn fields<'a, const N: usize>(line: &'a str, line_no: usize, shape: &str) -> Result<[&'a str; N]> {
    let parts: Vec<&'a str> = line.split(',').map(str::trim).collect();
    parts
        .try_into()
        .map_err(|_| anyhow::anyhow!("line {line_no}: expected `{shape}`, got `{line}`"))
}
