use anyhow::{Context, Result};
use bugnav::driver::Path as RobotPath;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Path as a three-column frame: `index`, `x`, `y`.
pub fn path_frame(path: &RobotPath) -> Result<DataFrame> {
    let index: Vec<u32> = (0..path.len() as u32).collect();
    let df = df!(
        "index" => index,
        "x" => path.xs(),
        "y" => path.ys(),
    )?;
    Ok(df)
}

pub fn write_path_csv(path: &RobotPath, out: &Path) -> Result<()> {
    ensure_parent(out)?;
    let mut df = path_frame(path)?;
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(rows = df.height(), out = %out.display(), "path csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugnav::Point2;
    use tempfile::tempdir;

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let mut p = RobotPath::new();
        p.push(Point2::new(0.0, 0.0));
        p.push(Point2::new(0.5, 1.0));
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/run.csv");
        write_path_csv(&p, &out).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "index,x,y");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("1,0.5,"));
    }
}
