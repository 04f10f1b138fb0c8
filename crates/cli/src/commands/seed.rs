//! Seed the database with random sample data.
//!
//! Records go through the repository layer, so the same uniqueness rules
//! apply as in the API. Emails already present among live rows are skipped.
//!
//! ```bash
//! blueprint-cli seed users --count 100
//! blueprint-cli seed customers --count 50
//! ```

use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use rest_blueprint_api::context::RequestContext;
use rest_blueprint_api::db::{
    CustomerRepository, PgCustomerRepository, PgUserRepository, RepositoryError, UserRepository,
};
use rest_blueprint_api::models::customer::DEFAULT_COUNTRY;
use rest_blueprint_api::models::{NewCustomer, NewUser};
use rest_blueprint_core::Email;

use super::{CommandError, connect};

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Alex", "Sarah", "Mike", "Emma", "David", "Lisa", "Chris", "Anna", "Tom",
    "Maria", "James", "Linda", "Robert", "Patricia", "Michael", "Jennifer", "William", "Elizabeth",
];

const USER_LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

const USER_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "example.com",
    "test.com",
    "company.com",
];

const CUSTOMER_LAST_NAMES: &[&str] = &[
    "Wijaya", "Santoso", "Kurniawan", "Sari", "Pratama", "Utomo", "Handayani", "Susanto",
    "Maharani", "Gunawan", "Fitria", "Permana", "Rahayu", "Nugroho", "Safitri", "Hidayat",
    "Wulandari", "Setiawan", "Anggraini", "Putra",
];

const CITIES: &[&str] = &[
    "Jakarta",
    "Surabaya",
    "Bandung",
    "Medan",
    "Semarang",
    "Makassar",
    "Palembang",
    "Tangerang",
    "Depok",
    "Bekasi",
    "Solo",
    "Batam",
    "Pekanbaru",
    "Bandar Lampung",
    "Malang",
    "Yogyakarta",
    "Bogor",
    "Denpasar",
    "Samarinda",
    "Balikpapan",
];

const CUSTOMER_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "company.id",
    "email.com",
];

const STREETS: &[&str] = &[
    "Jl. Sudirman",
    "Jl. Thamrin",
    "Jl. Gatot Subroto",
    "Jl. Kuningan",
    "Jl. Senayan",
    "Jl. Kemang",
    "Jl. Pondok Indah",
    "Jl. Kelapa Gading",
    "Jl. Pluit",
    "Jl. PIK",
];

const MIN_AGE_DAYS: u64 = 18 * 365;
const MAX_AGE_DAYS: u64 = 65 * 365;
const ACTIVE_RATIO: f64 = 0.9;

/// Outcome counts for one seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// `First.Last<n>@domain`, with `n` in 1..=999.
fn sample_email<R: Rng + ?Sized>(
    rng: &mut R,
    first: &str,
    last: &str,
    domains: &[&str],
) -> Option<Email> {
    let n: u16 = rng.random_range(1..=999);
    Email::parse(&format!("{first}.{last}{n}@{}", pick(rng, domains))).ok()
}

/// Generate one random user.
pub fn random_user<R: Rng + ?Sized>(rng: &mut R) -> Option<NewUser> {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, USER_LAST_NAMES);

    Some(NewUser {
        name: format!("{first} {last}"),
        email: sample_email(rng, first, last, USER_DOMAINS)?,
    })
}

/// Generate one random Indonesian customer, born 18 to 65 years before `today`.
pub fn random_customer<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Option<NewCustomer> {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, CUSTOMER_LAST_NAMES);
    let email = sample_email(rng, first, last, CUSTOMER_DOMAINS)?;

    let operator_digit: u8 = rng.random_range(1..=9);
    let subscriber: u32 = rng.random_range(10_000_000..=99_999_999);
    let house_number: u8 = rng.random_range(1..=100);
    let age_days = rng.random_range(MIN_AGE_DAYS..MAX_AGE_DAYS);

    Some(NewCustomer {
        first_name: first.to_owned(),
        last_name: last.to_owned(),
        email,
        phone: Some(format!("+628{operator_digit}{subscriber}")),
        address: Some(format!("{} No. {house_number}", pick(rng, STREETS))),
        city: Some(pick(rng, CITIES).to_owned()),
        country: Some(DEFAULT_COUNTRY.to_owned()),
        date_of_birth: today.checked_sub_days(Days::new(age_days)),
        is_active: Some(rng.random_bool(ACTIVE_RATIO)),
    })
}

/// Insert `count` random users.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be reached. Individual
/// insert failures are logged and counted.
pub async fn users(count: usize) -> Result<SeedSummary, CommandError> {
    let (config, pool) = connect().await?;
    let repo = PgUserRepository::new(pool);
    let ctx = RequestContext::background(config.db.query_timeout());

    let samples: Vec<NewUser> = {
        let mut rng = rand::rng();
        (0..count).filter_map(|_| random_user(&mut rng)).collect()
    };

    info!("Generating {} random users...", samples.len());

    let mut summary = SeedSummary::default();
    for (index, user) in samples.into_iter().enumerate() {
        match repo.get_by_email(&ctx, &user.email).await {
            Ok(_) => {
                info!(email = %user.email, "Sample user already exists");
                summary.skipped += 1;
                continue;
            }
            Err(RepositoryError::NotFound) => {}
            Err(e) => {
                warn!(email = %user.email, error = %e, "Failed to check sample user");
                summary.failed += 1;
                continue;
            }
        }

        let email = user.email.clone();
        match repo.create(&ctx, user).await {
            Ok(created) => {
                info!(index = index + 1, name = %created.name, email = %created.email, "Sample user created");
                summary.created += 1;
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Failed to create sample user");
                summary.failed += 1;
            }
        }
    }

    info!(
        total_created = summary.created,
        total_skipped = summary.skipped,
        total_failed = summary.failed,
        "User seeding complete!"
    );
    Ok(summary)
}

/// Insert `count` random customers.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be reached. Individual
/// insert failures are logged and counted.
pub async fn customers(count: usize) -> Result<SeedSummary, CommandError> {
    let (config, pool) = connect().await?;
    let repo = PgCustomerRepository::new(pool);
    let ctx = RequestContext::background(config.db.query_timeout());

    let today = Utc::now().date_naive();
    let samples: Vec<NewCustomer> = {
        let mut rng = rand::rng();
        (0..count)
            .filter_map(|_| random_customer(&mut rng, today))
            .collect()
    };

    info!("Generating {} sample customers...", samples.len());

    let mut summary = SeedSummary::default();
    for (index, customer) in samples.into_iter().enumerate() {
        match repo.get_by_email(&ctx, &customer.email).await {
            Ok(_) => {
                info!(email = %customer.email, "Sample customer already exists");
                summary.skipped += 1;
                continue;
            }
            Err(RepositoryError::NotFound) => {}
            Err(e) => {
                warn!(email = %customer.email, error = %e, "Failed to check sample customer");
                summary.failed += 1;
                continue;
            }
        }

        let email = customer.email.clone();
        match repo.create(&ctx, customer).await {
            Ok(created) => {
                info!(
                    index = index + 1,
                    name = %created.full_name(),
                    email = %created.email,
                    city = created.city.as_deref().unwrap_or_default(),
                    is_active = created.is_active,
                    "Sample customer created"
                );
                summary.created += 1;
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Failed to create sample customer");
                summary.failed += 1;
            }
        }
    }

    info!(
        total_created = summary.created,
        total_skipped = summary.skipped,
        total_failed = summary.failed,
        "Customer seeding complete!"
    );
    Ok(summary)
}
