use crate::config::UsersApiConfig;
use crate::constants::CSV_ID_COLUMN;
use crate::error::{EtlError, Result};
use crate::types::{ApiUser, User};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// One row of the input CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "UserID")]
    user_id: u64,
}

/// Reads the user IDs to process from a CSV file. Rows that fail to parse
/// are logged and skipped; an unreadable file is an error.
pub fn read_user_ids<P: AsRef<Path>>(csv_path: P) -> Result<Vec<u64>> {
    let path = csv_path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        EtlError::Config(format!("Failed to open CSV file '{}': {}", path.display(), e))
    })?;
    let ids = read_user_ids_from_reader(file)?;
    info!("Extracted {} user IDs from {}", ids.len(), path.display());
    Ok(ids)
}

fn read_user_ids_from_reader<R: Read>(reader: R) -> Result<Vec<u64>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut ids = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => {
                // Duplicate IDs would collide on the output filename
                if seen.insert(row.user_id) {
                    ids.push(row.user_id);
                } else {
                    warn!("Skipping duplicate {} {} at row {}", CSV_ID_COLUMN, row.user_id, index + 1);
                }
            }
            Err(e) => {
                warn!("Skipping unparseable CSV row {}: {}", index + 1, e);
            }
        }
    }
    Ok(ids)
}

/// Client for the placeholder user-listing API.
pub struct UserDirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl UserDirectoryClient {
    pub fn new(config: &UsersApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the full user listing as a JSON array.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<ApiUser>> {
        let url = format!("{}/users", self.base_url);
        debug!("Fetching user listing from {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(EtlError::Api {
                message: format!(
                    "User listing request returned status {}",
                    response.status().as_u16()
                ),
            });
        }
        let users: Vec<ApiUser> = response.json().await?;
        info!("Fetched {} users from listing endpoint", users.len());
        Ok(users)
    }
}

/// Result of merging CSV IDs with the remote listing.
pub struct ExtractOutcome {
    /// Merged users in CSV order, decorated with simulated accounts
    pub users: Vec<User>,
    /// CSV IDs with no matching user in the listing
    pub missing_ids: Vec<u64>,
}

/// Merges CSV rows with the fetched listing: the CSV selects which users to
/// process, the API object supplies the attributes.
pub fn merge_listing(ids: &[u64], listing: Vec<ApiUser>) -> ExtractOutcome {
    let by_id: HashMap<u64, ApiUser> = listing.into_iter().map(|u| (u.id, u)).collect();

    let mut users = Vec::new();
    let mut missing_ids = Vec::new();
    for &id in ids {
        match by_id.get(&id) {
            Some(api_user) => {
                debug!("User {}: {} loaded", id, api_user.name);
                users.push(User::from_api(api_user.clone()));
            }
            None => {
                warn!("User {} not present in listing", id);
                missing_ids.push(id);
            }
        }
    }

    info!(
        "Merged {} users ({} missing from listing)",
        users.len(),
        missing_ids.len()
    );
    ExtractOutcome { users, missing_ids }
}
