//! Activity library directory loader
//!
//! Parses the on-disk library layout: a directory of plain-text tables
//! keyed by activity/role name.
//!
//! - `activities.txt` — one activity name per line, in order
//! - `intentional.txt` / `physical.txt` — kind subsets
//! - `roles.txt` — one role name per line, in order
//! - `concentration.txt` — `NAME alpha` per line
//! - `role_dist.txt` — `NAME w1 w2 ...` per line (one weight per role)
//! - `kernels.txt` — `NAME scale sigma` per line
//! - `targets.txt` — names with a spatial target (optional file)
//! - `<role>.states.txt` / `<role>.initial.txt` / `<role>.transition.txt`
//!   — the per-role Markov chain as paired string/vector files
//!
//! Blank lines and lines starting with `#` are ignored everywhere.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{ActivityKind, ActivityLibrary};
use crate::errors::LoadError;

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim().to_string()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .collect())
}

fn parse_f64(token: &str, path: &Path, line: usize) -> Result<f64, LoadError> {
    token.parse::<f64>().map_err(|_| LoadError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("expected a number, got {:?}", token),
    })
}

fn read_names(path: &Path) -> Result<Vec<String>, LoadError> {
    Ok(read_lines(path)?.into_iter().map(|(_, l)| l).collect())
}

fn read_vector(path: &Path) -> Result<Vec<f64>, LoadError> {
    let mut out = Vec::new();
    for (line, text) in read_lines(path)? {
        for token in text.split_whitespace() {
            out.push(parse_f64(token, path, line)?);
        }
    }
    Ok(out)
}

fn read_matrix(path: &Path) -> Result<Vec<Vec<f64>>, LoadError> {
    let mut rows = Vec::new();
    for (line, text) in read_lines(path)? {
        let row: Result<Vec<f64>, LoadError> = text
            .split_whitespace()
            .map(|t| parse_f64(t, path, line))
            .collect();
        rows.push(row?);
    }
    Ok(rows)
}

/// Load an activity library from a directory of plain-text tables.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<ActivityLibrary, LoadError> {
    let dir = dir.as_ref();
    let file = |name: &str| -> PathBuf { dir.join(name) };

    let activities = read_names(&file("activities.txt"))?;
    let intentional: HashSet<String> = read_names(&file("intentional.txt"))?.into_iter().collect();
    let physical: HashSet<String> = read_names(&file("physical.txt"))?.into_iter().collect();
    let roles = read_names(&file("roles.txt"))?;

    let mut builder = ActivityLibrary::builder();
    for name in &activities {
        let kind = if intentional.contains(name) {
            ActivityKind::Intentional
        } else if physical.contains(name) {
            ActivityKind::Physical
        } else {
            return Err(LoadError::Invalid {
                description: format!(
                    "activity {:?} appears in neither intentional.txt nor physical.txt",
                    name
                ),
            });
        };
        builder = builder.activity(name.clone(), kind);
    }
    for role in &roles {
        builder = builder.role(role.clone());
    }

    let conc_path = file("concentration.txt");
    for (line, text) in read_lines(&conc_path)? {
        let mut tokens = text.split_whitespace();
        // read_lines drops blank lines, so a first token always exists
        let name = tokens.next().unwrap_or_default().to_string();
        let alpha = tokens.next().ok_or_else(|| LoadError::Parse {
            path: conc_path.clone(),
            line,
            message: "expected `NAME alpha`".to_string(),
        })?;
        builder = builder.concentration(name, parse_f64(alpha, &conc_path, line)?);
    }

    let dist_path = file("role_dist.txt");
    for (line, text) in read_lines(&dist_path)? {
        let mut tokens = text.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_string();
        let weights: Result<Vec<f64>, LoadError> =
            tokens.map(|t| parse_f64(t, &dist_path, line)).collect();
        builder = builder.role_distribution(name, weights?);
    }

    let kernel_path = file("kernels.txt");
    for (line, text) in read_lines(&kernel_path)? {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(LoadError::Parse {
                path: kernel_path.clone(),
                line,
                message: format!("expected `NAME scale sigma`, got {} fields", tokens.len()),
            });
        }
        builder = builder.kernel(
            tokens[0].to_string(),
            parse_f64(tokens[1], &kernel_path, line)?,
            parse_f64(tokens[2], &kernel_path, line)?,
        );
    }

    let targets_path = file("targets.txt");
    if targets_path.exists() {
        for name in read_names(&targets_path)? {
            builder = builder.target(name);
        }
    }

    for role in &roles {
        let labels = read_names(&file(&format!("{}.states.txt", role)))?;
        let initial = read_vector(&file(&format!("{}.initial.txt", role)))?;
        let transition = read_matrix(&file(&format!("{}.transition.txt", role)))?;
        builder = builder.chain(role.clone(), labels, initial, transition);
    }

    builder.build()
}
