use std::fs;

use anyhow::Result;
use calamine::{open_workbook_auto, Data, Reader};
use tempfile::tempdir;
use test_case::test_case;

use pipeline_cleaner::batch::{BatchOptions, BatchRunner, OutputTarget};
use pipeline_cleaner::table::{ExportFormat, TableLoader};
use pipeline_cleaner::{
    ClassifierConfig, OpportunityRecord, PipelineProcessor, ProcessOptions, RegionClassifier, RegionLabel,
    StatusClassifier, StatusLabel,
};

const PIPELINE_CSV: &str = "\
Opportunity Name,Opportunity Description,Proposal age,Billing Country,Stage
Acme (Hold),2026,,United States,Negotiation
Beta Direct,,0-3 Months,Untied States,Proposal
Gamma CRO,Jan 24 status check,,Germany,Proposal
Delta Direct,Oct 25 renewal,12+ Months,,Closing
Epsilon,\"Updated Oct 24. Target close 2026.
Oct 25 follow-up\",6-12 Months,Mars,Proposal
";

fn write_pipeline(dir: &std::path::Path, name: &str) -> Result<std::path::PathBuf> {
    let path = dir.join(name);
    fs::write(&path, PIPELINE_CSV)?;
    Ok(path)
}

#[test]
fn test_end_to_end_scenario() {
    let records = vec![
        OpportunityRecord::named("Acme (Hold)").with_notes("2026"),
        OpportunityRecord::named("Beta Direct").with_age("0-3 Months"),
        OpportunityRecord::named("Gamma CRO").with_notes("Jan 24 status check"),
        OpportunityRecord::named("Delta Direct").with_notes("Oct 25 renewal"),
    ];

    let processor = PipelineProcessor::with_defaults();
    let results = processor.process(&records);

    assert_eq!(results.len(), records.len());
    pretty_assertions::assert_eq!(
        results.iter().map(|r| r.status).collect::<Vec<_>>(),
        vec![StatusLabel::OnHold, StatusLabel::Active, StatusLabel::CroUpdateNeeded, StatusLabel::Active]
    );
}

#[test_case("hold"; "lower")]
#[test_case("HOLD"; "upper")]
#[test_case("[Hold]"; "bracketed")]
#[test_case("(hOlD) Direct"; "mixed with direct")]
fn test_hold_priority_over_every_signal(marker: &str) {
    let classifier = StatusClassifier::default();
    let name = format!("Acme {}", marker);

    for notes in [None, Some(""), Some("2026 signed"), Some("Oct 25"), Some("2024")] {
        for age in [None, Some("0-3 Months"), Some("3 to 6 months"), Some("12+ Months")] {
            assert_eq!(classifier.classify_status(&name, notes, age), StatusLabel::OnHold);
        }
    }
}

#[test]
fn test_age_bypass_ignores_notes() {
    let classifier = StatusClassifier::default();
    for age in ["0-3 Months", "3-6 Months", "0 to 3 MONTHS", "3 to 6 months"] {
        for notes in [None, Some("Jan 23 stale"), Some("nan")] {
            assert_eq!(classifier.classify_status("Acme Direct", notes, Some(age)), StatusLabel::Active);
        }
    }
}

#[test]
fn test_classification_is_deterministic() {
    let processor = PipelineProcessor::with_defaults();
    let record = OpportunityRecord::named("Epsilon Direct")
        .with_notes("3/4/24 check-in\n2026 plan")
        .with_country("Frannce");

    assert_eq!(processor.classify(&record), processor.classify(&record));
    assert_eq!(processor.classify(&record).status, StatusLabel::DirectUpdateNeeded);
    assert_eq!(processor.classify(&record).region, RegionLabel::Eu);
}

#[test_case(Some("United States") => RegionLabel::Us)]
#[test_case(Some("USA") => RegionLabel::Us)]
#[test_case(Some("Untied States") => RegionLabel::Us)]
#[test_case(Some("United States (USA)") => RegionLabel::Us)]
#[test_case(Some("Mars") => RegionLabel::RestOfWorld)]
#[test_case(None => RegionLabel::MissingCountry)]
fn test_region_examples(country: Option<&str>) -> RegionLabel {
    RegionClassifier::default().classify_region(country)
}

#[test]
fn test_batch_run_writes_workbook() -> Result<()> {
    let dir = tempdir()?;
    let input = write_pipeline(dir.path(), "pipeline.csv")?;

    let runner = BatchRunner::new(PipelineProcessor::with_defaults(), BatchOptions::default());
    let outcome = runner.run(&input)?;

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.reports.len(), 1);
    let summary = &outcome.summary;
    assert_eq!(summary.total, 5);
    assert_eq!(summary.hold_count(), 1);
    assert_eq!(summary.status_count(StatusLabel::Active), 2);
    assert_eq!(summary.status_count(StatusLabel::CroUpdateNeeded), 2);
    assert_eq!(summary.region_count(RegionLabel::Us), 2);
    assert_eq!(summary.region_count(RegionLabel::MissingCountry), 1);

    let output = dir.path().join("pipeline_cleaned.xlsx");
    assert_eq!(outcome.reports[0].output.as_deref(), Some(output.as_path()));

    let mut workbook = open_workbook_auto(&output)?;
    pretty_assertions::assert_eq!(workbook.sheet_names(), vec!["Cleaned Pipeline".to_string(), "Summary".to_string()]);

    let range = workbook.worksheet_range("Cleaned Pipeline")?;
    let rows: Vec<Vec<String>> = range.rows()
        .map(|row| row.iter().map(|cell| match cell {
            Data::String(s) => s.clone(),
            Data::Empty => String::new(),
            other => other.to_string(),
        }).collect())
        .collect();

    pretty_assertions::assert_eq!(rows[0][5..], ["Status".to_string(), "Region".to_string()]);
    let statuses: Vec<&str> = rows[1..].iter().map(|row| row[5].as_str()).collect();
    pretty_assertions::assert_eq!(statuses, vec!["On Hold", "Active", "CRO Update Needed", "Active", "CRO Update Needed"]);
    let regions: Vec<&str> = rows[1..].iter().map(|row| row[6].as_str()).collect();
    pretty_assertions::assert_eq!(regions, vec!["US", "US", "EU", "Missing Country", "Rest of World"]);
    Ok(())
}

#[test]
fn test_batch_run_over_directory_to_csv() -> Result<()> {
    let dir = tempdir()?;
    let inputs = dir.path().join("exports");
    fs::create_dir_all(&inputs)?;
    write_pipeline(&inputs, "east.csv")?;
    write_pipeline(&inputs, "west.csv")?;
    let out_dir = dir.path().join("cleaned");

    let runner = BatchRunner::new(PipelineProcessor::new(&ClassifierConfig::default(), ProcessOptions::default()), BatchOptions {
        output: OutputTarget::Directory(out_dir.clone()),
        format: ExportFormat::Csv,
    });
    let outcome = runner.run(&inputs)?;

    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(outcome.summary.total, 10);
    assert_eq!(outcome.summary.hold_count(), 2);

    let loaded = TableLoader::new().load(out_dir.join("east_cleaned.csv"))?;
    assert_eq!(loaded.table.len(), 5);
    let status_col = loaded.table.column_index("Status").expect("status column");
    assert_eq!(loaded.table.cell(2, status_col), "CRO Update Needed");
    Ok(())
}

#[test]
fn test_same_named_tables_in_subfolders_keep_separate_outputs() -> Result<()> {
    let dir = tempdir()?;
    let inputs = dir.path().join("exports");
    fs::create_dir_all(inputs.join("q3"))?;
    fs::create_dir_all(inputs.join("q4"))?;
    write_pipeline(&inputs.join("q3"), "a.csv")?;
    fs::write(inputs.join("q4").join("a.csv"), "Opportunity Name,Country\nAcme Hold,USA\n")?;
    let out_dir = dir.path().join("cleaned");

    let runner = BatchRunner::new(PipelineProcessor::with_defaults(), BatchOptions {
        output: OutputTarget::Directory(out_dir.clone()),
        format: ExportFormat::Csv,
    });
    let outcome = runner.run(&inputs)?;

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.summary.total, 6);
    assert_eq!(TableLoader::new().load(out_dir.join("q3").join("a_cleaned.csv"))?.table.len(), 5);
    assert_eq!(TableLoader::new().load(out_dir.join("q4").join("a_cleaned.csv"))?.table.len(), 1);
    Ok(())
}

#[test]
fn test_colliding_outputs_fail_before_writing() -> Result<()> {
    let dir = tempdir()?;
    write_pipeline(dir.path(), "a.csv")?;
    fs::write(dir.path().join("a.xlsx"), "not a workbook")?;

    let runner = BatchRunner::new(PipelineProcessor::with_defaults(), BatchOptions {
        output: OutputTarget::BesideInput,
        format: ExportFormat::Csv,
    });
    assert!(runner.run(dir.path()).is_err());
    assert!(!dir.path().join("a_cleaned.csv").exists());
    Ok(())
}

#[test]
fn test_output_file_rejected_for_many_inputs() -> Result<()> {
    let dir = tempdir()?;
    write_pipeline(dir.path(), "a.csv")?;
    write_pipeline(dir.path(), "b.csv")?;

    let runner = BatchRunner::new(PipelineProcessor::with_defaults(), BatchOptions {
        output: OutputTarget::File(dir.path().join("out.xlsx")),
        format: ExportFormat::Xlsx,
    });
    assert!(runner.run(dir.path()).is_err());
    Ok(())
}

#[test]
fn test_unreadable_table_is_reported_not_fatal() -> Result<()> {
    let dir = tempdir()?;
    write_pipeline(dir.path(), "good.csv")?;
    fs::write(dir.path().join("broken.xlsx"), "not a workbook")?;

    let runner = BatchRunner::new(PipelineProcessor::with_defaults(), BatchOptions::default());
    let outcome = runner.run(dir.path())?;

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].0.ends_with("broken.xlsx"));
    Ok(())
}
