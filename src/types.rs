use crate::constants::{
    ACCOUNT_AGENCY, ACCOUNT_BALANCE_MAX, ACCOUNT_BALANCE_MIN, ACCOUNT_LIMIT, NEWS_CATEGORY,
    NEWS_ICON_URL,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Postal address as returned by the placeholder user API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

/// Employer details as returned by the placeholder user API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase", default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

/// Raw user object from the user-listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    pub address: Option<Address>,
    pub company: Option<Company>,
}

/// Simulated bank account attached to each merged user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub number: String,
    pub agency: String,
    pub balance: f64,
    pub limit: f64,
}

impl Account {
    /// Builds a demo account for the given user: fixed agency and limit,
    /// randomized balance rounded to cents. The generator is seeded from the
    /// user ID so repeated runs see the same balance.
    pub fn simulated(user_id: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(user_id);
        let balance: f64 = rng.gen_range(ACCOUNT_BALANCE_MIN..ACCOUNT_BALANCE_MAX);
        Self {
            number: format!("001{user_id:04}"),
            agency: ACCOUNT_AGENCY.to_string(),
            balance: (balance * 100.0).round() / 100.0,
            limit: ACCOUNT_LIMIT,
        }
    }
}

/// Merged user record held in memory for one pipeline pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Option<Address>,
    pub company: Option<Company>,
    pub account: Account,
}

impl User {
    pub fn from_api(api_user: ApiUser) -> Self {
        let account = Account::simulated(api_user.id);
        Self {
            id: api_user.id,
            name: api_user.name,
            username: api_user.username,
            email: api_user.email,
            phone: api_user.phone,
            website: api_user.website,
            address: api_user.address,
            company: api_user.company,
            account,
        }
    }

    pub fn company_name(&self) -> &str {
        self.company.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }
}

/// Generated message wrapped for the output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u32,
    pub date: DateTime<Utc>,
    pub icon: String,
    pub description: String,
    pub category: String,
    pub read: bool,
}

impl NewsItem {
    pub fn investment_advice(id: u32, description: String) -> Self {
        Self {
            id,
            date: Utc::now(),
            icon: NEWS_ICON_URL.to_string(),
            description,
            category: NEWS_CATEGORY.to_string(),
            read: false,
        }
    }
}

/// Per-user output document: merged attributes plus the generated news.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(flatten)]
    pub user: User,
    pub news: Vec<NewsItem>,
}

/// Core trait for the per-user message generation step. The pipeline only
/// depends on this, so tests can substitute a deterministic stub.
#[async_trait::async_trait]
pub trait MessageGenerator: Send + Sync {
    /// Unique identifier for this generator backend
    fn generator_name(&self) -> &'static str;

    /// Produce one personalized investment message for the user
    async fn generate(&self, user: &User) -> Result<String>;
}
