use crate::constants::REPORT_FILE_NAME;
use crate::error::Result;
use crate::report::EtlReport;
use crate::types::UserDocument;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists one user's document as pretty-printed JSON under the output
/// directory, named `user_<id>_<run-stamp>.json`.
pub fn write_user_document(
    document: &UserDocument,
    output_dir: &str,
    run_stamp: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let filename = format!("user_{}_{}.json", document.user.id, run_stamp);
    let filepath = Path::new(output_dir).join(&filename);

    let json_content = serde_json::to_string_pretty(document)?;
    fs::write(&filepath, json_content)?;

    debug!("Wrote user document {}", filepath.display());
    Ok(filepath)
}

/// Writes the aggregate run report next to the user documents.
pub fn write_report(report: &EtlReport, output_dir: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let filepath = Path::new(output_dir).join(REPORT_FILE_NAME);
    let json_content = serde_json::to_string_pretty(report)?;
    fs::write(&filepath, json_content)?;

    debug!("Wrote report {}", filepath.display());
    Ok(filepath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunStats;
    use crate::types::{Account, NewsItem, User};
    use tempfile::tempdir;

    fn test_document(id: u64) -> UserDocument {
        UserDocument {
            user: User {
                id,
                name: "Ervin Howell".to_string(),
                username: "Antonette".to_string(),
                email: "Shanna@melissa.tv".to_string(),
                phone: String::new(),
                website: String::new(),
                address: None,
                company: None,
                account: Account {
                    number: format!("001{id:04}"),
                    agency: "0001".to_string(),
                    balance: 2500.0,
                    limit: 5000.0,
                },
            },
            news: vec![NewsItem::investment_advice(1, "Grow your savings".to_string())],
        }
    }

    #[test]
    fn test_write_user_document_filename_pattern() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().to_str().unwrap();

        let path = write_user_document(&test_document(2), output_dir, "20250101_120000").unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "user_2_20250101_120000.json"
        );

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["id"], 2);
        assert_eq!(written["news"][0]["description"], "Grow your savings");
    }

    #[test]
    fn test_write_report_round_trips() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().to_str().unwrap();

        let mut stats = RunStats::begin();
        stats.record_success(1, "Ervin Howell", "user_1_x.json".to_string());
        let report = stats.finish();

        let path = write_report(&report, output_dir).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), REPORT_FILE_NAME);

        let written: EtlReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.total_users, 1);
        assert_eq!(written.succeeded, 1);
        assert_eq!(written.run_id, report.run_id);
    }

    #[test]
    fn test_write_creates_missing_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let output_dir = nested.to_str().unwrap();

        write_user_document(&test_document(1), output_dir, "20250101_120000").unwrap();
        assert!(nested.join("user_1_20250101_120000.json").exists());
    }
}
