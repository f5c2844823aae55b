use std::path::Path;

use anyhow::{Result, Context, bail, ensure};
use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook};

use crate::classify::processor::PipelineSummary;
use crate::classify::types::{ClassificationResult, RegionLabel, StatusLabel};
use crate::utils::file_utils;
use super::types::Table;

pub const STATUS_HEADER: &str = "Status";
pub const REGION_HEADER: &str = "Region";
pub const PIPELINE_SHEET: &str = "Cleaned Pipeline";
pub const SUMMARY_SHEET: &str = "Summary";

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Format implied by a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if file_utils::has_extension(path, "xlsx") {
            Some(ExportFormat::Xlsx)
        } else if file_utils::has_extension(path, "csv") {
            Some(ExportFormat::Csv)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Writes classified tables back out
#[derive(Debug, Default)]
pub struct TableExporter {}

impl TableExporter {
    pub fn new() -> Self {
        Self {}
    }

    /// Original table with status and region columns set from the results
    pub fn augment(&self, table: &Table, results: &[ClassificationResult]) -> Result<Table> {
        ensure!(
            table.len() == results.len(),
            "Table has {} rows but {} classification results",
            table.len(),
            results.len()
        );

        let mut headers = table.headers.clone();
        let status_col = column_or_append(&mut headers, STATUS_HEADER);
        let region_col = column_or_append(&mut headers, REGION_HEADER);

        let rows = table.rows.iter()
            .zip(results)
            .map(|(row, result)| {
                let mut cells = row.clone();
                cells.resize(headers.len(), String::new());
                cells[status_col] = result.status.display_name().to_string();
                cells[region_col] = result.region.display_name().to_string();
                cells
            })
            .collect();

        Ok(Table::new(headers, rows))
    }

    /// Write an augmented table in the given format
    pub fn export(&self, table: &Table, summary: &PipelineSummary, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            file_utils::ensure_dir_exists(parent)?;
        }

        match format {
            ExportFormat::Xlsx => self.export_xlsx(table, summary, path)?,
            ExportFormat::Csv => self.export_csv(table, path)?,
        }

        info!("Exported {} rows to {}", table.len(), path.display());
        Ok(())
    }

    /// Pipeline sheet plus a summary sheet of counts
    pub fn export_xlsx(&self, table: &Table, summary: &PipelineSummary, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(PIPELINE_SHEET)?;

            for (col, header) in table.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, to_col(col)?, header, &bold)
                    .with_context(|| format!("Failed to write header {:?}", header))?;
            }

            for (i, row) in table.rows.iter().enumerate() {
                let r = (i + 1) as u32;
                for (col, value) in row.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    worksheet.write_string(r, to_col(col)?, value)
                        .with_context(|| format!("Failed to write cell at row {}, column {}", r, col))?;
                }
            }
        }

        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(SUMMARY_SHEET)?;

            let mut r = 0u32;
            worksheet.write_string_with_format(r, 0, STATUS_HEADER, &bold)?;
            worksheet.write_string_with_format(r, 1, "Count", &bold)?;
            for status in StatusLabel::ALL {
                r += 1;
                worksheet.write_string(r, 0, status.display_name())?;
                worksheet.write_number(r, 1, summary.status_count(status) as f64)?;
            }

            r += 2;
            worksheet.write_string_with_format(r, 0, REGION_HEADER, &bold)?;
            worksheet.write_string_with_format(r, 1, "Count", &bold)?;
            for region in RegionLabel::ALL {
                r += 1;
                worksheet.write_string(r, 0, region.display_name())?;
                worksheet.write_number(r, 1, summary.region_count(region) as f64)?;
            }

            r += 2;
            worksheet.write_string_with_format(r, 0, "Total", &bold)?;
            worksheet.write_number(r, 1, summary.total as f64)?;
        }

        debug!("Saving workbook to {}", path.display());
        workbook.save(path)
            .with_context(|| format!("Failed to save workbook {}", path.display()))?;
        Ok(())
    }

    pub fn export_csv(&self, table: &Table, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

        writer.write_record(&table.headers)?;
        for row in &table.rows {
            let mut cells = row.clone();
            cells.resize(table.headers.len(), String::new());
            writer.write_record(&cells)?;
        }

        writer.flush()
            .with_context(|| format!("Failed to write CSV file {}", path.display()))?;
        Ok(())
    }
}

fn column_or_append(headers: &mut Vec<String>, header: &str) -> usize {
    match headers.iter().position(|h| h.eq_ignore_ascii_case(header)) {
        Some(index) => index,
        None => {
            headers.push(header.to_string());
            headers.len() - 1
        }
    }
}

fn to_col(col: usize) -> Result<u16> {
    match u16::try_from(col) {
        Ok(col) if col < 16_384 => Ok(col),
        _ => bail!("Column {} exceeds the spreadsheet column limit", col),
    }
}
