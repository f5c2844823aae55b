use std::path::Path;

use anyhow::{Result, Context, anyhow, bail};
use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info, warn};

use crate::utils::file_utils;
use super::types::{ColumnMapping, Table};

/// Extensions of spreadsheet formats read through calamine
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Table with its detected record columns
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub mapping: ColumnMapping,
}

/// Reads pipeline exports from CSV or spreadsheet files
#[derive(Debug, Default)]
pub struct TableLoader {}

impl TableLoader {
    pub fn new() -> Self {
        Self {}
    }

    /// Whether a file has a format this loader can read
    pub fn supports(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        file_utils::has_extension(path, "csv") || file_utils::has_any_extension(path, &WORKBOOK_EXTENSIONS)
    }

    /// Load a table and detect its record columns
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedTable> {
        let path = path.as_ref();
        debug!("Loading table from {}", path.display());

        let table = if file_utils::has_extension(path, "csv") {
            self.load_csv(path)?
        } else if file_utils::has_any_extension(path, &WORKBOOK_EXTENSIONS) {
            self.load_workbook(path)?
        } else {
            bail!("Unsupported table format: {}", path.display());
        };

        info!("Loaded {} rows with {} columns from {}", table.len(), table.headers.len(), path.display());

        let mapping = ColumnMapping::detect(&table.headers);
        Ok(LoadedTable { table, mapping })
    }

    /// Read a CSV file; ragged rows are accepted
    pub fn load_csv(&self, path: &Path) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

        let headers = reader.headers()
            .with_context(|| format!("Failed to read CSV header of {}", path.display()))?
            .iter()
            .map(clean_header)
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Failed to read CSV row {} of {}", index + 2, path.display()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Table::new(headers, rows))
    }

    /// Read the first worksheet of a spreadsheet
    pub fn load_workbook(&self, path: &Path) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook {}", path.display()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let first_sheet = sheet_names.first()
            .ok_or_else(|| anyhow!("Workbook {} has no worksheets", path.display()))?;
        if sheet_names.len() > 1 {
            warn!("Workbook {} has {} sheets, reading only {:?}", path.display(), sheet_names.len(), first_sheet);
        }

        let range = workbook.worksheet_range(first_sheet)
            .with_context(|| format!("Failed to read worksheet {:?} of {}", first_sheet, path.display()))?;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => header.iter().map(|cell| clean_header(&cell_to_string(cell))).collect(),
            None => return Ok(Table::default()),
        };

        let rows = rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(Table::new(headers, rows))
    }
}

fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({:?})", e),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_csv_with_bom_and_ragged_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pipeline.csv");
        fs::write(&path, "\u{feff}Opportunity Name , Opportunity Description,Proposal age\n\
            Acme,\"Oct 25 call\nJan 24 intro\",0-3 Months\n\
            Beta\n")?;

        let loaded = TableLoader::new().load(&path)?;
        assert_eq!(loaded.table.headers, vec!["Opportunity Name", "Opportunity Description", "Proposal age"]);
        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.mapping.name, Some(0));
        assert_eq!(loaded.mapping.country, None);

        let records = loaded.table.records(&loaded.mapping);
        assert_eq!(records[0].notes.as_deref(), Some("Oct 25 call\nJan 24 intro"));
        assert_eq!(records[1].name, "Beta");
        assert_eq!(records[1].notes, None);
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_format() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pipeline.txt");
        fs::write(&path, "Opportunity Name\nAcme\n")?;

        assert!(!TableLoader::supports(&path));
        assert!(TableLoader::new().load(&path).is_err());
        Ok(())
    }
}
