//! In-memory backend for tests.
//!
//! Holds users, tokens and restaurants in memory, records every call in
//! order, and can be told to fail specific operations.

#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use foodiefinds_core::{
    NewUser, Owner, Photo, Restaurant, RestaurantId, RestaurantInput, Role, User, UserId,
};

use super::{AccessToken, BackendApi, BackendError, ImageUpload, RestaurantQuery};

/// A call made against the fake, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ProbeHealth,
    CurrentUser,
    Login { email: String },
    Logout,
    Signup { email: String, role: Role },
    FindRestaurants(RestaurantQuery),
    CreateRestaurant(serde_json::Value),
    UpdateRestaurant { id: RestaurantId, payload: serde_json::Value },
    DeleteRestaurant(RestaurantId),
    UploadImage { entity: String, property: String, file_name: String },
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentUser,
    Login,
    Signup,
    FindRestaurants,
    CreateRestaurant,
    UpdateRestaurant,
    DeleteRestaurant,
    UploadImage,
}

#[derive(Default)]
struct Accounts {
    users: Vec<(User, String)>,
    tokens: HashMap<String, UserId>,
}

/// In-memory stand-in for the Manifest backend.
pub struct FakeBackend {
    reachable: Mutex<bool>,
    accounts: Mutex<Accounts>,
    restaurants: Mutex<Vec<Restaurant>>,
    failing: Mutex<HashSet<Operation>>,
    dropped: Mutex<HashSet<Operation>>,
    calls: Mutex<Vec<BackendCall>>,
    next_id: AtomicU64,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            reachable: Mutex::new(true),
            accounts: Mutex::new(Accounts::default()),
            restaurants: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            dropped: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose health probe and every other call fail at the
    /// transport level.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            reachable: Mutex::new(false),
            ..Self::default()
        }
    }

    /// Register a user account, returning it.
    pub async fn add_user(&self, name: &str, email: &str, password: &str, role: Role) -> User {
        let user = User {
            id: UserId::from(self.allocate_id()),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        self.accounts
            .lock()
            .await
            .users
            .push((user.clone(), password.to_string()));
        user
    }

    /// Issue a token for an existing user without going through login.
    pub async fn issue_token(&self, user: &User) -> AccessToken {
        let token = format!("token-{}-{}", user.id, self.allocate_id());
        self.accounts
            .lock()
            .await
            .tokens
            .insert(token.clone(), user.id.clone());
        AccessToken::new(token)
    }

    /// Add an existing restaurant owned by `owner`, returning it.
    pub async fn add_restaurant(&self, name: &str, owner: &User) -> Restaurant {
        let restaurant = Restaurant {
            id: RestaurantId::from(self.allocate_id()),
            name: name.to_string(),
            description: format!("{name} description"),
            cuisine: foodiefinds_core::Cuisine::American,
            cover_photo: None,
            owner_id: Some(owner.id.clone()),
            owner: Some(Owner {
                id: owner.id.clone(),
                name: owner.name.clone(),
            }),
            created_at: Some(Utc::now()),
        };
        self.restaurants.lock().await.insert(0, restaurant.clone());
        restaurant
    }

    /// Make every later call to `operation` fail with a server error.
    pub async fn fail(&self, operation: Operation) {
        self.failing.lock().await.insert(operation);
    }

    /// Make every later call to `operation` fail at the transport level,
    /// while the health probe keeps succeeding.
    pub async fn drop_connection(&self, operation: Operation) {
        self.dropped.lock().await.insert(operation);
    }

    /// Undo [`fail`](Self::fail) and [`drop_connection`](Self::drop_connection)
    /// for `operation`.
    pub async fn recover(&self, operation: Operation) {
        self.failing.lock().await.remove(&operation);
        self.dropped.lock().await.remove(&operation);
    }

    /// Flip transport-level reachability.
    pub async fn set_reachable(&self, reachable: bool) {
        *self.reachable.lock().await = reachable;
    }

    /// Every call made so far.
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    /// Number of calls matching a predicate.
    pub async fn count_calls(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| predicate(c)).count()
    }

    /// Restaurants currently stored.
    pub async fn stored_restaurants(&self) -> Vec<Restaurant> {
        self.restaurants.lock().await.clone()
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        i64::try_from(id).unwrap_or(i64::MAX)
    }

    async fn record(&self, call: BackendCall) {
        self.calls.lock().await.push(call);
    }

    /// Common preamble: transport check, then injected failure.
    async fn enter(&self, operation: Option<Operation>) -> Result<(), BackendError> {
        if !*self.reachable.lock().await {
            return Err(BackendError::Unreachable("connection refused".to_string()));
        }
        if let Some(op) = operation
            && self.dropped.lock().await.contains(&op)
        {
            return Err(BackendError::Unreachable("connection reset".to_string()));
        }
        if let Some(op) = operation
            && self.failing.lock().await.contains(&op)
        {
            return Err(BackendError::Server {
                status: 500,
                message: format!("injected failure for {op:?}"),
            });
        }
        Ok(())
    }

    async fn user_for(&self, token: &AccessToken) -> Result<User, BackendError> {
        let accounts = self.accounts.lock().await;
        let id = accounts
            .tokens
            .get(token.expose())
            .ok_or(BackendError::Unauthorized)?;
        accounts
            .users
            .iter()
            .find(|(u, _)| u.id == *id)
            .map(|(u, _)| u.clone())
            .ok_or(BackendError::Unauthorized)
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn probe_health(&self) -> Result<(), BackendError> {
        self.record(BackendCall::ProbeHealth).await;
        self.enter(None).await
    }

    async fn current_user(&self, token: &AccessToken) -> Result<User, BackendError> {
        self.record(BackendCall::CurrentUser).await;
        self.enter(Some(Operation::CurrentUser)).await?;
        self.user_for(token).await
    }

    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AccessToken, BackendError> {
        self.record(BackendCall::Login {
            email: email.to_string(),
        })
        .await;
        self.enter(Some(Operation::Login)).await?;

        let user = {
            let accounts = self.accounts.lock().await;
            accounts
                .users
                .iter()
                .find(|(u, p)| u.email == email && p == password.expose_secret())
                .map(|(u, _)| u.clone())
                .ok_or(BackendError::Unauthorized)?
        };
        Ok(self.issue_token(&user).await)
    }

    async fn logout(&self, token: &AccessToken) -> Result<(), BackendError> {
        self.record(BackendCall::Logout).await;
        self.accounts.lock().await.tokens.remove(token.expose());
        Ok(())
    }

    async fn signup(
        &self,
        user: &NewUser,
        password: &SecretString,
    ) -> Result<AccessToken, BackendError> {
        self.record(BackendCall::Signup {
            email: user.email.clone(),
            role: user.role,
        })
        .await;
        self.enter(Some(Operation::Signup)).await?;

        let taken = self
            .accounts
            .lock()
            .await
            .users
            .iter()
            .any(|(u, _)| u.email == user.email);
        if taken {
            return Err(BackendError::Rejected {
                status: 400,
                message: "email already exists".to_string(),
            });
        }

        let created = self
            .add_user(&user.name, &user.email, password.expose_secret(), user.role)
            .await;
        Ok(self.issue_token(&created).await)
    }

    async fn find_restaurants(
        &self,
        token: &AccessToken,
        query: &RestaurantQuery,
    ) -> Result<Vec<Restaurant>, BackendError> {
        self.record(BackendCall::FindRestaurants(query.clone())).await;
        self.enter(Some(Operation::FindRestaurants)).await?;
        self.user_for(token).await?;
        Ok(self.restaurants.lock().await.clone())
    }

    async fn create_restaurant(
        &self,
        token: &AccessToken,
        input: &RestaurantInput,
    ) -> Result<Restaurant, BackendError> {
        let payload = serde_json::to_value(input).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.record(BackendCall::CreateRestaurant(payload)).await;
        self.enter(Some(Operation::CreateRestaurant)).await?;
        let owner = self.user_for(token).await?;

        // Like the real backend, the created record does not include the
        // owner relation.
        let restaurant = Restaurant {
            id: RestaurantId::from(self.allocate_id()),
            name: input.name.clone(),
            description: input.description.clone(),
            cuisine: input.cuisine,
            cover_photo: input.cover_photo.clone(),
            owner_id: Some(owner.id),
            owner: None,
            created_at: Some(Utc::now()),
        };
        self.restaurants.lock().await.insert(0, restaurant.clone());
        Ok(restaurant)
    }

    async fn update_restaurant(
        &self,
        token: &AccessToken,
        id: &RestaurantId,
        input: &RestaurantInput,
    ) -> Result<Restaurant, BackendError> {
        let payload = serde_json::to_value(input).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.record(BackendCall::UpdateRestaurant {
            id: id.clone(),
            payload,
        })
        .await;
        self.enter(Some(Operation::UpdateRestaurant)).await?;
        let user = self.user_for(token).await?;

        let mut restaurants = self.restaurants.lock().await;
        let existing = restaurants
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or(BackendError::NotFound)?;
        if !user.owns(existing.owner_id.as_ref()) {
            return Err(BackendError::Unauthorized);
        }

        existing.name.clone_from(&input.name);
        existing.description.clone_from(&input.description);
        existing.cuisine = input.cuisine;
        if let Some(photo) = &input.cover_photo {
            existing.cover_photo = Some(photo.clone());
        }
        Ok(existing.clone())
    }

    async fn delete_restaurant(
        &self,
        token: &AccessToken,
        id: &RestaurantId,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::DeleteRestaurant(id.clone())).await;
        self.enter(Some(Operation::DeleteRestaurant)).await?;
        let user = self.user_for(token).await?;

        let mut restaurants = self.restaurants.lock().await;
        let index = restaurants
            .iter()
            .position(|r| r.id == *id)
            .ok_or(BackendError::NotFound)?;
        if restaurants
            .get(index)
            .is_some_and(|r| !user.owns(r.owner_id.as_ref()))
        {
            return Err(BackendError::Unauthorized);
        }
        restaurants.remove(index);
        Ok(())
    }

    async fn upload_image(
        &self,
        token: &AccessToken,
        entity: &str,
        property: &str,
        image: ImageUpload,
    ) -> Result<Photo, BackendError> {
        self.record(BackendCall::UploadImage {
            entity: entity.to_string(),
            property: property.to_string(),
            file_name: image.file_name.clone(),
        })
        .await;
        self.enter(Some(Operation::UploadImage)).await?;
        self.user_for(token).await?;

        let stem = format!("http://backend.test/storage/{entity}/{property}/{}", self.allocate_id());
        Ok(Photo::from_sizes([
            ("thumbnail", format!("{stem}-thumbnail.jpg")),
            ("large", format!("{stem}-large.jpg")),
        ]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_issues_token_for_matching_credentials() {
        let fake = FakeBackend::new();
        let user = fake.add_user("Ana", "ana@example.com", "pw", Role::Customer).await;

        let token = fake
            .login("ana@example.com", &SecretString::from("pw"))
            .await
            .unwrap();
        assert_eq!(fake.current_user(&token).await.unwrap(), user);

        let err = fake
            .login("ana@example.com", &SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_unreachable_fails_everything_at_transport_level() {
        let fake = FakeBackend::unreachable();
        assert!(fake.probe_health().await.unwrap_err().is_unreachable());
        assert!(
            fake.current_user(&AccessToken::new("t"))
                .await
                .unwrap_err()
                .is_unreachable()
        );
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let fake = FakeBackend::new();
        let owner = fake.add_user("Chef", "chef@example.com", "pw", Role::Chef).await;
        let other = fake.add_user("Other", "other@example.com", "pw", Role::Chef).await;
        let restaurant = fake.add_restaurant("Diner", &owner).await;

        let other_token = fake.issue_token(&other).await;
        let err = fake
            .delete_restaurant(&other_token, &restaurant.id)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let owner_token = fake.issue_token(&owner).await;
        fake.delete_restaurant(&owner_token, &restaurant.id).await.unwrap();
        assert!(fake.stored_restaurants().await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let fake = FakeBackend::new();
        let chef = fake.add_user("Chef", "chef@example.com", "pw", Role::Chef).await;
        let token = fake.issue_token(&chef).await;
        fake.fail(Operation::FindRestaurants).await;

        let err = fake
            .find_restaurants(&token, &RestaurantQuery::newest_with_owner(10))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Server { status: 500, .. }));
    }
}
