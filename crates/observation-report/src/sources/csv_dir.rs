use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{SourceError, Table, TableSource};

/// Reads `<dir>/<identifier>.csv`, the layout produced by exporting each sheet.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, identifier: &str) -> PathBuf {
        let file = if identifier.ends_with(".csv") {
            identifier.to_string()
        } else {
            format!("{identifier}.csv")
        };
        self.dir.join(file)
    }
}

impl TableSource for CsvDirectorySource {
    fn load(&self, identifier: &str) -> Result<Arc<Table>, SourceError> {
        let path = self.path_for(identifier);
        let file = std::fs::File::open(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    identifier: identifier.to_string(),
                    path: path.clone(),
                }
            } else {
                SourceError::Io {
                    identifier: identifier.to_string(),
                    source,
                }
            }
        })?;

        let table = Table::from_reader(identifier, file)?;
        debug!(identifier, path = %path.display(), rows = table.rows.len(), "loaded csv source");
        Ok(Arc::new(table))
    }
}
