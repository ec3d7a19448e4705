use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::domain::VertexId;

/// 2-D layout position per vertex
pub type Coordinates = BTreeMap<VertexId, (i64, i64)>;

/// Read a header line followed by `v,x,y` lines
pub fn read_coordinates(path: &Path) -> Result<Coordinates> {
    parse_coordinates(super::open(path)?)
        .with_context(|| format!("invalid coordinates file {}", path.display()))
}

pub fn parse_coordinates(reader: impl BufRead) -> Result<Coordinates> {
    let mut coords = Coordinates::new();
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let [v, x, y] = super::fields::<3>(&line, line_no, "v,x,y")?;
        let parse = |s: &str| -> Result<i64> {
            s.parse().with_context(|| format!("line {line_no}: bad number `{s}`"))
        };
        let vertex = VertexId::try_from(parse(v)?)
            .with_context(|| format!("line {line_no}: bad vertex `{v}`"))?;
        coords.insert(vertex, (parse(x)?, parse(y)?));
    }
    Ok(coords)
}
