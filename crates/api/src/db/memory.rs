//! In-memory store implementation for testing.
//!
//! [`InMemoryStore`] implements every repository trait over `RwLock`-guarded
//! vectors. Rows are never removed, so a row's id is its position plus one and
//! soft deletes behave exactly as they do in `PostgreSQL`.
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: No durability, no cross-process coordination
//! - **No persistence**: All state is lost when the process exits

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use rest_blueprint_core::{CustomerId, Email, UserId};

use super::{CustomerRepository, Liveness, RepositoryError, UserRepository};
use crate::context::RequestContext;
use crate::models::{Customer, NewCustomer, NewUser, User};

/// In-memory store for tests and local experiments.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    customers: RwLock<Vec<Customer>>,
    offline: AtomicBool,
    latency_ms: AtomicU64,
}

fn poison_err<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_owned())
}

fn next_id(len: usize) -> Result<i32, RepositoryError> {
    i32::try_from(len + 1).map_err(|_| RepositoryError::Unavailable("id space exhausted".to_owned()))
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `Unavailable` until switched back.
    ///
    /// Lets tests exercise the store-failure paths of handlers and the health check.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delays every subsequent call by `latency`, as a slow database would.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Returns a stored user by id, including soft-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn stored_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().map_err(poison_err)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    /// Returns a stored customer by id, including soft-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn stored_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().map_err(poison_err)?;
        Ok(customers.iter().find(|c| c.id == id).cloned())
    }

    async fn ensure_online(&self) -> Result<(), RepositoryError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("store is offline".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_all(&self, _ctx: &RequestContext) -> Result<Vec<User>, RepositoryError> {
        self.ensure_online().await?;
        let users = self.users.read().map_err(poison_err)?;
        Ok(users.iter().filter(|u| u.deleted_at.is_none()).cloned().collect())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, id: UserId) -> Result<User, RepositoryError> {
        self.ensure_online().await?;
        let users = self.users.read().map_err(poison_err)?;
        users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_email(
        &self,
        _ctx: &RequestContext,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        self.ensure_online().await?;
        let users = self.users.read().map_err(poison_err)?;
        users
            .iter()
            .find(|u| &u.email == email && u.deleted_at.is_none())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create(&self, _ctx: &RequestContext, user: NewUser) -> Result<User, RepositoryError> {
        self.ensure_online().await?;
        let mut users = self.users.write().map_err(poison_err)?;

        if users
            .iter()
            .any(|u| u.email == user.email && u.deleted_at.is_none())
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(next_id(users.len())?),
            name: user.name,
            email: user.email,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(created.clone());
        drop(users);

        Ok(created)
    }

    async fn update(&self, _ctx: &RequestContext, user: &User) -> Result<(), RepositoryError> {
        self.ensure_online().await?;
        let mut users = self.users.write().map_err(poison_err)?;

        if users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email && u.deleted_at.is_none())
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id && u.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        stored.name.clone_from(&user.name);
        stored.email = user.email.clone();
        stored.updated_at = Utc::now();

        Ok(())
    }

    async fn delete(&self, _ctx: &RequestContext, id: UserId) -> Result<(), RepositoryError> {
        self.ensure_online().await?;
        let mut users = self.users.write().map_err(poison_err)?;

        let stored = users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        let now = Utc::now();
        stored.deleted_at = Some(now);
        stored.updated_at = now;

        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn get_all(&self, _ctx: &RequestContext) -> Result<Vec<Customer>, RepositoryError> {
        self.ensure_online().await?;
        let customers = self.customers.read().map_err(poison_err)?;
        Ok(customers
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn get_by_id(
        &self,
        _ctx: &RequestContext,
        id: CustomerId,
    ) -> Result<Customer, RepositoryError> {
        self.ensure_online().await?;
        let customers = self.customers.read().map_err(poison_err)?;
        customers
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_email(
        &self,
        _ctx: &RequestContext,
        email: &Email,
    ) -> Result<Customer, RepositoryError> {
        self.ensure_online().await?;
        let customers = self.customers.read().map_err(poison_err)?;
        customers
            .iter()
            .find(|c| &c.email == email && c.deleted_at.is_none())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_first_name(
        &self,
        _ctx: &RequestContext,
        first_name: &str,
    ) -> Result<Vec<Customer>, RepositoryError> {
        self.ensure_online().await?;
        let customers = self.customers.read().map_err(poison_err)?;
        Ok(customers
            .iter()
            .filter(|c| c.first_name == first_name && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        customer: NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        self.ensure_online().await?;
        let mut customers = self.customers.write().map_err(poison_err)?;

        if customers
            .iter()
            .any(|c| c.email == customer.email && c.deleted_at.is_none())
        {
            return Err(RepositoryError::Conflict(
                "customer email already exists".to_owned(),
            ));
        }

        let now = Utc::now();
        let country = customer.country_or_default().to_owned();
        let is_active = customer.is_active_or_default();
        let created = Customer {
            id: CustomerId::new(next_id(customers.len())?),
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            city: customer.city,
            country,
            date_of_birth: customer.date_of_birth,
            is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        customers.push(created.clone());
        drop(customers);

        Ok(created)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        customer: &Customer,
    ) -> Result<(), RepositoryError> {
        self.ensure_online().await?;
        let mut customers = self.customers.write().map_err(poison_err)?;

        if customers
            .iter()
            .any(|c| c.id != customer.id && c.email == customer.email && c.deleted_at.is_none())
        {
            return Err(RepositoryError::Conflict(
                "customer email already exists".to_owned(),
            ));
        }

        let stored = customers
            .iter_mut()
            .find(|c| c.id == customer.id && c.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        let created_at = stored.created_at;
        *stored = Customer {
            created_at,
            updated_at: Utc::now(),
            deleted_at: None,
            ..customer.clone()
        };

        Ok(())
    }

    async fn delete(&self, _ctx: &RequestContext, id: CustomerId) -> Result<(), RepositoryError> {
        self.ensure_online().await?;
        let mut customers = self.customers.write().map_err(poison_err)?;

        let stored = customers
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        let now = Utc::now();
        stored.deleted_at = Some(now);
        stored.updated_at = now;

        Ok(())
    }
}

#[async_trait]
impl Liveness for InMemoryStore {
    async fn round_trip(&self) -> Result<i32, RepositoryError> {
        self.ensure_online().await?;
        Ok(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::DEFAULT_QUERY_TIMEOUT;

    fn ctx() -> RequestContext {
        RequestContext::background(DEFAULT_QUERY_TIMEOUT)
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: Email::parse(email).unwrap(),
        }
    }

    fn new_customer(first_name: &str, email: &str) -> NewCustomer {
        NewCustomer {
            first_name: first_name.to_owned(),
            last_name: "Wijaya".to_owned(),
            email: Email::parse(email).unwrap(),
            phone: None,
            address: None,
            city: None,
            country: None,
            date_of_birth: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_lookup_by_id_and_email() {
        let store = InMemoryStore::new();
        let ctx = ctx();

        let created = UserRepository::create(&store, &ctx, new_user("Ana", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(created.id, UserId::new(1));

        let by_id = UserRepository::get_by_id(&store, &ctx, created.id)
            .await
            .unwrap();
        let by_email = UserRepository::get_by_email(&store, &ctx, &created.email)
            .await
            .unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_email, created);
    }

    #[tokio::test]
    async fn test_duplicate_live_email_conflicts() {
        let store = InMemoryStore::new();
        let ctx = ctx();

        UserRepository::create(&store, &ctx, new_user("Ana", "ana@example.com"))
            .await
            .unwrap();
        let err = UserRepository::create(&store, &ctx, new_user("Ana 2", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_row_and_frees_email() {
        let store = InMemoryStore::new();
        let ctx = ctx();

        let user = UserRepository::create(&store, &ctx, new_user("Ana", "ana@example.com"))
            .await
            .unwrap();
        UserRepository::delete(&store, &ctx, user.id).await.unwrap();

        let err = UserRepository::get_by_id(&store, &ctx, user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(UserRepository::get_all(&store, &ctx).await.unwrap().is_empty());

        // Row is kept with its marker set.
        let stored = store.stored_user(user.id).unwrap().unwrap();
        assert!(stored.deleted_at.is_some());

        // Deleting again finds no live row.
        let err = UserRepository::delete(&store, &ctx, user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        // The email is free among live rows again.
        let again = UserRepository::create(&store, &ctx, new_user("Ana", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(again.id, UserId::new(2));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let store = InMemoryStore::new();
        let ctx = ctx();

        UserRepository::create(&store, &ctx, new_user("Ana", "ana@example.com"))
            .await
            .unwrap();
        let mut budi = UserRepository::create(&store, &ctx, new_user("Budi", "budi@example.com"))
            .await
            .unwrap();

        budi.email = Email::parse("ana@example.com").unwrap();
        let err = UserRepository::update(&store, &ctx, &budi).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        budi.name = "Budi Santoso".to_owned();
        budi.email = Email::parse("budi.santoso@example.com").unwrap();
        UserRepository::update(&store, &ctx, &budi).await.unwrap();
        let stored = UserRepository::get_by_id(&store, &ctx, budi.id)
            .await
            .unwrap();
        assert_eq!(stored.name, "Budi Santoso");
    }

    #[tokio::test]
    async fn test_customer_defaults_and_first_name_lookup() {
        let store = InMemoryStore::new();
        let ctx = ctx();

        let james = CustomerRepository::create(&store, &ctx, new_customer("James", "j1@example.com"))
            .await
            .unwrap();
        CustomerRepository::create(&store, &ctx, new_customer("Jameson", "j2@example.com"))
            .await
            .unwrap();
        CustomerRepository::create(&store, &ctx, new_customer("James", "j3@example.com"))
            .await
            .unwrap();

        assert_eq!(james.country, "Indonesia");
        assert!(james.is_active);

        let matches = store.get_by_first_name(&ctx, "James").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|c| c.first_name == "James"));
        assert!(store.get_by_first_name(&ctx, "james").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customer_soft_delete_keeps_row() {
        let store = InMemoryStore::new();
        let ctx = ctx();

        let sari = CustomerRepository::create(&store, &ctx, new_customer("Sari", "sari@example.com"))
            .await
            .unwrap();
        CustomerRepository::delete(&store, &ctx, sari.id).await.unwrap();

        assert!(matches!(
            CustomerRepository::get_by_id(&store, &ctx, sari.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(store.get_by_first_name(&ctx, "Sari").await.unwrap().is_empty());

        let row = store.stored_customer(sari.id).unwrap().unwrap();
        assert!(row.deleted_at.is_some());
        assert_eq!(row.email, sari.email);

        assert!(matches!(
            CustomerRepository::delete(&store, &ctx, sari.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_latency_delays_calls() {
        let store = InMemoryStore::new();
        store.set_latency(Duration::from_millis(50));

        let started = std::time::Instant::now();
        assert_eq!(store.round_trip().await.unwrap(), 1);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = InMemoryStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.round_trip().await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(UserRepository::get_all(&store, &ctx()).await.is_err());

        store.set_offline(false);
        assert_eq!(store.round_trip().await.unwrap(), 1);
    }
}
