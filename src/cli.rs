use crate::api_client::HttpTransport;
use crate::errors::AppError;
use crate::expenses::{ExpenseQuery, mask_email, month_bounds};
use crate::initializer::InitializedApp;
use crate::models::{ExpenseCategory, ExpensePage, NewExpense, SignupRequest};
use crate::validation::password_strength;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const ENV_PASSWORD: &str = "EXPENSE_SESSION_PASSWORD";

/// Expense Session - command line client for the expense tracker backend
#[derive(Parser)]
#[command(name = "expense-session")]
#[command(about = "Sign in to the expense tracker and manage expenses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the configuration file)
    #[arg(short, long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Account email; the password is read from EXPENSE_SESSION_PASSWORD or prompted
    #[arg(short, long, value_name = "EMAIL", global = true)]
    pub email: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Show the signed-in account
    Whoami,

    /// Create an account and sign in with it
    Signup(SignupArgs),

    /// List expenses
    Expenses(ListArgs),

    /// Record a new expense
    Add(AddArgs),

    /// Delete an expense
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Monthly totals and the breakdown by category
    Summary(RangeArgs),

    /// List the expense categories
    Categories,

    /// Print the OAuth2 login URL for browser sign-in
    LoginUrl,
}

#[derive(Args, Clone, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Page number, starting at 0
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = 10)]
    pub size: u32,

    /// Only this category (e.g. FOOD)
    #[arg(long)]
    pub category: Option<ExpenseCategory>,

    #[command(flatten)]
    pub range: RangeArgs,
}

impl ListArgs {
    /// Listing for the given bounds, this month's expenses when none are given
    fn query(&self, today: NaiveDate) -> ExpenseQuery {
        let base = match (self.range.since, self.range.until) {
            (None, None) => ExpenseQuery::current_month(today),
            _ => {
                let (start, end) = self.range.resolve(today);
                ExpenseQuery {
                    start_date: Some(start),
                    end_date: Some(end),
                    ..Default::default()
                }
            }
        };
        ExpenseQuery {
            page: self.page,
            size: self.size,
            category: self.category,
            ..base
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub amount: f64,

    #[arg(long)]
    pub category: ExpenseCategory,

    #[arg(long)]
    pub description: String,

    /// Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

impl RangeArgs {
    /// Explicit bounds, or the current month when neither is given
    fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (month_start, month_end) = month_bounds(today);
        match (self.since, self.until) {
            (None, None) => (month_start, month_end),
            (since, until) => (since.unwrap_or(month_start), until.unwrap_or(month_end)),
        }
    }
}

/// Email and password for one invocation
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Password from the environment, otherwise an interactive prompt
    pub fn resolve(email: Option<String>) -> Result<Self, AppError> {
        let email = email.ok_or_else(|| AppError::Generic {
            message: "This command needs an account: pass --email".to_string(),
        })?;

        let password = match std::env::var(ENV_PASSWORD) {
            Ok(password) if !password.is_empty() => password,
            _ => rpassword::prompt_password(format!("Password for {}: ", email)).map_err(|e| {
                AppError::Generic {
                    message: format!("Failed to read password: {}", e),
                }
            })?,
        };

        Ok(Self { email, password })
    }
}

impl Commands {
    /// Commands that run without signing in
    pub fn is_local(&self) -> bool {
        matches!(self, Commands::Categories | Commands::LoginUrl)
    }
}

pub async fn handle_command<T: HttpTransport>(
    app: &InitializedApp<T>,
    command: Commands,
    credentials: Option<Credentials>,
) -> Result<(), AppError> {
    match command {
        Commands::Categories => {
            for category in ExpenseCategory::ALL {
                println!("{}", category);
            }
            return Ok(());
        }
        Commands::LoginUrl => {
            println!("{}", app.session.oauth_login_url()?);
            return Ok(());
        }
        _ => {}
    }

    let credentials = credentials.ok_or_else(|| AppError::Generic {
        message: "This command needs an account: pass --email".to_string(),
    })?;

    app.session.initialize().await;
    let signed_in = match command {
        Commands::Signup(ref args) => {
            let request = SignupRequest {
                first_name: args.first_name.clone(),
                last_name: args.last_name.clone(),
                email: credentials.email.clone(),
                password: credentials.password.clone(),
            };
            let strength = password_strength(&request.password);
            tracing::debug!("Password strength: {} ({}/5)", strength.label, strength.score);
            app.session.signup(&request).await?
        }
        _ => {
            app.session
                .login(&credentials.email, &credentials.password, false)
                .await?
        }
    };
    if signed_in.user().is_none() {
        return Err(AppError::Generic {
            message: "Another sign-in is already in progress".to_string(),
        });
    }

    let result = run_signed_in(app, command).await;

    // Sign out whether or not the command succeeded
    app.session.logout()?;
    result
}

async fn run_signed_in<T: HttpTransport>(
    app: &InitializedApp<T>,
    command: Commands,
) -> Result<(), AppError> {
    let today = Local::now().date_naive();

    match command {
        Commands::Whoami | Commands::Signup(_) => {
            let user = app.expenses.profile().await?;
            println!("{} <{}>", user.name(), mask_email(&user.email));
            println!("ID: {}", user.id);
            let preferences = app.expenses.preferences().await?;
            println!(
                "Currency: {}, default category: {}",
                preferences.currency, preferences.default_category
            );
        }
        Commands::Expenses(args) => {
            let query = args.query(today);
            print_page(&app.expenses.list(&query).await?);
        }
        Commands::Add(args) => {
            let expense = NewExpense {
                amount: args.amount,
                category: args.category,
                description: args.description,
                date: args.date.unwrap_or(today),
            };
            let created = app.expenses.create(&expense).await?;
            println!("Created expense {}", created.id);
        }
        Commands::Delete { id } => {
            app.expenses.delete(id).await?;
            println!("Deleted expense {}", id);
        }
        Commands::Summary(range) => {
            let (start, end) = range.resolve(today);
            println!("Monthly totals {} .. {}", start, end);
            for month in app.expenses.monthly_summary(start, end).await? {
                println!("  {:04}-{:02}  {:>10.2}", month.year, month.month, month.total);
            }
            println!("By category");
            for entry in app.expenses.category_summary().await? {
                println!("  {:<15} {:>10.2}", entry.category, entry.total);
            }
        }
        Commands::Categories | Commands::LoginUrl => {}
    }

    Ok(())
}

fn print_page(page: &ExpensePage) {
    if page.content.is_empty() {
        println!("No expenses found.");
        return;
    }
    for expense in &page.content {
        println!(
            "[{}] {} {:<15} {:>10.2}  {}",
            expense.id, expense.date, expense.category, expense.amount, expense.description
        );
    }
    println!(
        "Page {} of {} ({} expenses)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiResponse;
    use crate::api_client::testing::StubTransport;
    use crate::config::Config;
    use crate::initializer::initialize_application_with_transport;
    use reqwest::StatusCode;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn backend() -> StubTransport {
        StubTransport::new(|request| match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/api/auth/login") => Ok(ApiResponse::from_json(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "user": {"id": "1", "email": "a@b.com"},
                    "accessToken": "tok1"
                }),
            )),
            ("DELETE", "/api/expenses/5") => Ok(ApiResponse::new(StatusCode::NO_CONTENT, "")),
            _ => Ok(ApiResponse::new(StatusCode::NOT_FOUND, "")),
        })
    }

    fn credentials() -> Option<Credentials> {
        Some(Credentials {
            email: "a@b.com".to_string(),
            password: "pw1".to_string(),
        })
    }

    #[test]
    fn test_parse_expenses_command() {
        let cli = Cli::try_parse_from([
            "expense-session",
            "--email",
            "a@b.com",
            "expenses",
            "--category",
            "food",
            "--since",
            "2024-06-01",
            "--size",
            "20",
        ])
        .unwrap();

        assert_eq!(cli.email.as_deref(), Some("a@b.com"));
        match cli.command {
            Commands::Expenses(args) => {
                assert_eq!(args.page, 0);
                assert_eq!(args.size, 20);
                assert_eq!(args.category, Some(ExpenseCategory::Food));
                assert_eq!(args.range.since, Some(date(2024, 6, 1)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let result = Cli::try_parse_from([
            "expense-session",
            "add",
            "--amount",
            "1",
            "--category",
            "pets",
            "--description",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_range_defaults_to_current_month() {
        let today = date(2024, 2, 10);
        assert_eq!(
            RangeArgs::default().resolve(today),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        let partial = RangeArgs {
            since: Some(date(2024, 1, 15)),
            until: None,
        };
        assert_eq!(partial.resolve(today), (date(2024, 1, 15), date(2024, 2, 29)));
    }

    #[test]
    fn test_expenses_without_range_lists_current_month() {
        let today = date(2024, 2, 10);
        let cli = Cli::try_parse_from(["expense-session", "expenses", "--size", "5"]).unwrap();
        let Commands::Expenses(args) = cli.command else {
            panic!("expected the expenses command");
        };

        let query = args.query(today);
        assert_eq!(
            query,
            ExpenseQuery {
                size: 5,
                ..ExpenseQuery::current_month(today)
            }
        );
        assert_eq!(query.start_date, Some(date(2024, 2, 1)));

        let ranged = ListArgs {
            range: RangeArgs {
                since: None,
                until: Some(date(2024, 1, 31)),
            },
            ..args
        };
        let query = ranged.query(today);
        assert_eq!(query.start_date, Some(date(2024, 2, 1)));
        assert_eq!(query.end_date, Some(date(2024, 1, 31)));
        assert_eq!(query.size, 5);
    }

    #[test]
    fn test_local_commands() {
        assert!(Commands::Categories.is_local());
        assert!(Commands::LoginUrl.is_local());
        assert!(!Commands::Whoami.is_local());
    }

    #[tokio::test]
    async fn test_local_command_needs_no_credentials() {
        let transport = backend();
        let requests = transport.requests();
        let app = initialize_application_with_transport(Config::default(), transport).unwrap();

        handle_command(&app, Commands::LoginUrl, None).await.unwrap();
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_logs_in_and_out() {
        let transport = backend();
        let requests = transport.requests();
        let app = initialize_application_with_transport(Config::default(), transport).unwrap();

        handle_command(&app, Commands::Delete { id: 5 }, credentials())
            .await
            .unwrap();

        let paths: Vec<String> = requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect();
        assert_eq!(paths, vec!["/api/auth/login", "/api/expenses/5"]);
        assert!(app.store.get_token().is_none());
        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_command_still_logs_out() {
        let app = initialize_application_with_transport(Config::default(), backend()).unwrap();

        let err = handle_command(&app, Commands::Delete { id: 6 }, credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(_)));
        assert!(app.store.get_token().is_none());
    }

    #[tokio::test]
    async fn test_remote_command_without_email_fails() {
        let app = initialize_application_with_transport(Config::default(), backend()).unwrap();
        assert!(handle_command(&app, Commands::Whoami, None).await.is_err());
    }
}
