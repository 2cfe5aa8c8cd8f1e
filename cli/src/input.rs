use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Non-blank lines from `path`, or from stdin when no path is given.
pub fn read_lines(path: Option<&Path>) -> Result<Vec<String>> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parse a `name=value` density override.
pub fn parse_density(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected name=value, got {arg:?}"))?;
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(format!("missing ingredient name in {arg:?}"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid density in {arg:?}"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("density must be positive in {arg:?}"));
    }
    Ok((name, value))
}
