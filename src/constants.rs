/// Shared constants for endpoints, file naming, and the simulated bank data.
/// Defaults match the public demo services the pipeline was written against.

// Default external endpoints
pub const DEFAULT_USERS_API_BASE: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_GENERATION_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-3.5-turbo";

/// Environment variable holding the generation API key. Never hard-code the key.
pub const GENERATION_API_KEY_ENV: &str = "ETL_GENERATION_API_KEY";

// CSV input schema
pub const CSV_ID_COLUMN: &str = "UserID";

// Output layout
pub const DEFAULT_OUTPUT_DIR: &str = "user_updates";
pub const REPORT_FILE_NAME: &str = "etl_report.json";
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// News item decoration for generated messages
pub const NEWS_CATEGORY: &str = "investment_advice";
pub const NEWS_ICON_URL: &str =
    "https://cdn-icons-png.flaticon.com/512/3135/3135679.png";

// Simulated bank account parameters
pub const ACCOUNT_AGENCY: &str = "0001";
pub const ACCOUNT_LIMIT: f64 = 5000.0;
pub const ACCOUNT_BALANCE_MIN: f64 = 1000.0;
pub const ACCOUNT_BALANCE_MAX: f64 = 50000.0;
