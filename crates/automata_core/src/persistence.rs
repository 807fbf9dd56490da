//! Saving and loading grids and rule sets.
//!
//! Grids are stored as plain CSV, one line per row, comma-separated
//! integer states. Rule sets are stored as pretty-printed JSON and are
//! validated on load.

use crate::config::ConfigError;
use crate::grid::{Grid, GridError, State};
use crate::rule::RuleSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// Errors that can occur while reading or writing files.
#[derive(Debug)]
pub enum PersistError {
    /// IO error
    Io(std::io::Error),
    /// JSON syntax or shape error
    Json(serde_json::Error),
    /// Malformed CSV line (1-based)
    Csv { line: usize, message: String },
    /// Parsed cells do not form a valid grid
    Grid(GridError),
    /// Parsed rule set or config failed validation
    Config(ConfigError),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "IO error: {}", e),
            PersistError::Json(e) => write!(f, "JSON error: {}", e),
            PersistError::Csv { line, message } => {
                write!(f, "CSV error on line {}: {}", line, message)
            }
            PersistError::Grid(e) => write!(f, "invalid grid: {}", e),
            PersistError::Config(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Json(e) => Some(e),
            PersistError::Grid(e) => Some(e),
            PersistError::Config(e) => Some(e),
            PersistError::Csv { .. } => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

impl From<GridError> for PersistError {
    fn from(e: GridError) -> Self {
        PersistError::Grid(e)
    }
}

impl From<ConfigError> for PersistError {
    fn from(e: ConfigError) -> Self {
        PersistError::Config(e)
    }
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Write `grid` as CSV.
pub fn write_csv<W: Write>(grid: &Grid, mut writer: W) -> PersistResult<()> {
    for row in grid.cells().chunks(grid.cols()) {
        let line: Vec<String> = row.iter().map(|s| s.to_string()).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

/// Save `grid` to a CSV file.
pub fn save_csv<P: AsRef<Path>>(grid: &Grid, path: P) -> PersistResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(grid, BufWriter::new(file))?;
    info!(path = %path.display(), rows = grid.rows(), cols = grid.cols(), "saved grid");
    Ok(())
}

/// Parse a CSV grid whose states belong to `alphabet`.
///
/// Blank lines are skipped. Surrounding whitespace around each value is
/// ignored.
pub fn read_csv<R: Read>(reader: R, alphabet: &[State]) -> PersistResult<Grid> {
    let mut rows = Vec::new();
    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let row = trimmed
            .split(',')
            .map(|field| {
                let field = field.trim();
                field.parse::<State>().map_err(|_| PersistError::Csv {
                    line: i + 1,
                    message: format!("'{}' is not a state", field),
                })
            })
            .collect::<PersistResult<Vec<State>>>()?;
        rows.push(row);
    }
    Ok(Grid::from_rows(rows, alphabet)?)
}

/// Load a CSV grid file.
pub fn load_csv<P: AsRef<Path>>(path: P, alphabet: &[State]) -> PersistResult<Grid> {
    let path = path.as_ref();
    let grid = read_csv(File::open(path)?, alphabet)?;
    info!(path = %path.display(), rows = grid.rows(), cols = grid.cols(), "loaded grid");
    Ok(grid)
}

/// Serialize a rule set as pretty-printed JSON.
pub fn rule_set_to_json(rule_set: &RuleSet) -> PersistResult<String> {
    Ok(serde_json::to_string_pretty(rule_set)?)
}

/// Save a rule set to a JSON file.
pub fn save_rule_set<P: AsRef<Path>>(rule_set: &RuleSet, path: P) -> PersistResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(rule_set_to_json(rule_set)?.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), rules = rule_set.rule_count(), "saved rule set");
    Ok(())
}

/// Parse and validate a rule set from JSON text.
pub fn rule_set_from_json(text: &str) -> PersistResult<RuleSet> {
    let rule_set: RuleSet = serde_json::from_str(text)?;
    rule_set.validate()?;
    Ok(rule_set)
}

/// Load and validate a rule set file.
pub fn load_rule_set<P: AsRef<Path>>(path: P) -> PersistResult<RuleSet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let rule_set = rule_set_from_json(&text)?;
    info!(
        path = %path.display(),
        states = ?rule_set.states(),
        rules = rule_set.rule_count(),
        "loaded rule set"
    );
    Ok(rule_set)
}
