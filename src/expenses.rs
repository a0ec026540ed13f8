use crate::api_client::{ApiClient, ApiRequest, HttpTransport, ReqwestTransport};
use crate::errors::ApiError;
use crate::models::{
    CategorySummary, CurrentUser, Expense, ExpenseCategory, ExpensePage, MonthlySummary,
    NewExpense, ProfileUpdate, UserPreferences,
};
use chrono::{Datelike, Months, NaiveDate};
use std::sync::Arc;

const EXPENSES_PATH: &str = "/api/expenses";
const SUMMARY_PATH: &str = "/api/expenses/summary";
const CATEGORY_SUMMARY_PATH: &str = "/api/expenses/category-summary";
const PROFILE_PATH: &str = "/api/me";
const PREFERENCES_PATH: &str = "/api/me/preferences";

/// Filters and paging for `GET /api/expenses`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub page: u32,
    pub size: u32,
    pub category: Option<ExpenseCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for ExpenseQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            category: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl ExpenseQuery {
    /// First through last day of the month containing `today`
    pub fn current_month(today: NaiveDate) -> Self {
        let (start, end) = month_bounds(today);
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        request = request
            .with_query("page", self.page)
            .with_query("size", self.size);
        if let Some(category) = self.category {
            request = request.with_query("category", category);
        }
        if let Some(start) = self.start_date {
            request = request.with_query("startDate", start);
        }
        if let Some(end) = self.end_date {
            request = request.with_query("endDate", end);
        }
        request
    }
}

pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (start, end)
}

/// Expense, profile and preference endpoints. Every call goes through the
/// shared client, so the bearer token and expiry handling apply here too.
pub struct ExpenseApi<T = ReqwestTransport> {
    client: Arc<ApiClient<T>>,
}

impl<T: HttpTransport> ExpenseApi<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ExpenseQuery) -> Result<ExpensePage, ApiError> {
        let request = query.apply(ApiRequest::get(EXPENSES_PATH));
        let page: ExpensePage = self.client.send_json(request).await?;
        tracing::debug!(
            "Fetched {} of {} expenses (page {})",
            page.content.len(),
            page.total_elements,
            page.number
        );
        Ok(page)
    }

    pub async fn get(&self, id: i64) -> Result<Expense, ApiError> {
        self.client
            .get_json(&format!("{}/{}", EXPENSES_PATH, id))
            .await
    }

    pub async fn create(&self, expense: &NewExpense) -> Result<Expense, ApiError> {
        let created: Expense = self.client.post_json(EXPENSES_PATH, expense).await?;
        tracing::info!("Created expense {}", created.id);
        Ok(created)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("{}/{}", EXPENSES_PATH, id))
            .await?;
        tracing::info!("Deleted expense {}", id);
        Ok(())
    }

    pub async fn monthly_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlySummary>, ApiError> {
        let request = ApiRequest::get(SUMMARY_PATH)
            .with_query("startDate", start)
            .with_query("endDate", end);
        self.client.send_json(request).await
    }

    pub async fn category_summary(&self) -> Result<Vec<CategorySummary>, ApiError> {
        self.client.get_json(CATEGORY_SUMMARY_PATH).await
    }

    pub async fn profile(&self) -> Result<CurrentUser, ApiError> {
        self.client.get_json(PROFILE_PATH).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<CurrentUser, ApiError> {
        self.client.put_json(PROFILE_PATH, update).await
    }

    pub async fn preferences(&self) -> Result<UserPreferences, ApiError> {
        self.client.get_json(PREFERENCES_PATH).await
    }

    pub async fn update_preferences(
        &self,
        preferences: &UserPreferences,
    ) -> Result<UserPreferences, ApiError> {
        self.client.put_json(PREFERENCES_PATH, preferences).await
    }
}

/// Masks an address for display: `john@example.com` becomes `j**n@e*****e.com`
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let masked_domain = match domain.split_once('.') {
        Some((name, rest)) => format!("{}.{}", mask_part(name), rest),
        None => mask_part(domain),
    };
    format!("{}@{}", mask_part(local), masked_domain)
}

fn mask_part(part: &str) -> String {
    let chars: Vec<char> = part.chars().collect();
    match chars.as_slice() {
        [] | [_] => part.to_string(),
        [first, middle @ .., last] => {
            let mut masked = String::with_capacity(part.len());
            masked.push(*first);
            masked.extend(std::iter::repeat_n('*', middle.len()));
            masked.push(*last);
            masked
        }
    }
}
