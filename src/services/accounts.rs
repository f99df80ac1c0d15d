use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserPatch};
use crate::services::auth::AuthService;
use crate::services::store::{Collection, Repository, StoreError};

/// User registration, login, and bearer-token authentication.
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn Repository>,
    auth: Arc<AuthService>,
}

impl Accounts {
    pub fn new(store: Arc<dyn Repository>, auth: Arc<AuthService>) -> Self {
        Self { store, auth }
    }

    /// Create an account and sign the user in. Email uniqueness is enforced
    /// by the store in the same step as the insert, so two concurrent
    /// registrations for one email cannot both land.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<AuthResponse> {
        let now = chrono::Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            password_hash: self.auth.hash_password(&req.password)?,
            photo: req.photo,
            location: req.location,
            preferences: req.preferences.unwrap_or_default(),
            saved_events: vec![],
            created_events: vec![],
            created_at: now,
            updated_at: now,
        };

        let doc = serde_json::to_value(&user).map_err(|e| ApiError::Internal(e.to_string()))?;
        let stored = self
            .store
            .insert_unique(Collection::Users, doc, "email")
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey(_) => {
                    ApiError::Conflict("email already registered".to_string())
                }
                other => ApiError::Store(other),
            })?;

        let user = decode_user(stored)?;
        tracing::info!(user_id = %user.id, "user registered");
        self.auth_response(user)
    }

    /// Verify credentials and issue a token. A missing account and a wrong
    /// password produce the same error, so the response does not reveal
    /// which emails are registered.
    pub async fn login(&self, req: LoginRequest) -> ApiResult<AuthResponse> {
        let found = self
            .store
            .find_eq(Collection::Users, "email", &Value::from(req.email.clone()))
            .await?
            .into_iter()
            .next();

        let user = match found {
            Some(doc) => decode_user(doc)?,
            None => return Err(ApiError::InvalidCredentials),
        };
        if !self.auth.verify_password(&req.password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "login succeeded");
        self.auth_response(user)
    }

    /// Resolve a bearer token to its user. A valid token whose subject has
    /// since been deleted is still a 401, not a 404.
    pub async fn authenticate(&self, token: &str) -> ApiResult<User> {
        let subject = self.auth.decode_token(token)?;
        let doc = self
            .store
            .find_by_id(Collection::Users, &subject)
            .await?
            .ok_or(ApiError::UnknownSubject)?;
        decode_user(doc)
    }

    /// Apply an allow-listed profile patch and return the updated user.
    pub async fn update_profile(&self, user_id: &str, patch: UserPatch) -> ApiResult<User> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = patch.name {
            fields.insert("name".to_string(), Value::from(name));
        }
        if let Some(photo) = patch.photo {
            fields.insert("photo".to_string(), Value::from(photo));
        }
        if let Some(location) = patch.location {
            fields.insert(
                "location".to_string(),
                serde_json::to_value(location).map_err(|e| ApiError::Internal(e.to_string()))?,
            );
        }
        if let Some(preferences) = patch.preferences {
            fields.insert(
                "preferences".to_string(),
                serde_json::to_value(preferences).map_err(|e| ApiError::Internal(e.to_string()))?,
            );
        }

        let updated = self.store.update(Collection::Users, user_id, fields).await?;
        if !updated {
            return Err(ApiError::NotFound("user".to_string()));
        }

        let doc = self
            .store
            .find_by_id(Collection::Users, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user".to_string()))?;
        decode_user(doc)
    }

    /// Issue a fresh token for an already-authenticated user.
    pub fn refresh(&self, user: User) -> ApiResult<AuthResponse> {
        self.auth_response(user)
    }

    fn auth_response(&self, user: User) -> ApiResult<AuthResponse> {
        let access_token = self.auth.issue_token(&user.id)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.auth.ttl_secs(),
        })
    }
}

fn decode_user(doc: Value) -> ApiResult<User> {
    serde_json::from_value(doc).map_err(|e| {
        ApiError::Store(StoreError::Corrupt {
            collection: Collection::Users.as_str(),
            reason: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    fn accounts() -> Accounts {
        let store: Arc<dyn Repository> = Arc::new(MemoryStore::new());
        let auth = Arc::new(AuthService::new("test-secret", 3600));
        Accounts::new(store, auth)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "hunter42".to_string(),
            photo: None,
            location: None,
            preferences: None,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let accounts = accounts();
        let registered = accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(registered.token_type, "bearer");
        assert_eq!(registered.user.email, "ada@example.com");

        let logged_in = accounts
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "hunter42".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let accounts = accounts();
        accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let err = accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_alike() {
        let accounts = accounts();
        accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let wrong_password = accounts
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = accounts
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "hunter42".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn token_resolves_to_user() {
        let accounts = accounts();
        let registered = accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let user = accounts
            .authenticate(&registered.access_token)
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        assert!(matches!(
            accounts.authenticate("not-a-token").await.unwrap_err(),
            ApiError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn deleted_subject_is_unauthorized() {
        let store: Arc<dyn Repository> = Arc::new(MemoryStore::new());
        let auth = Arc::new(AuthService::new("test-secret", 3600));
        let accounts = Accounts::new(store, Arc::clone(&auth));

        // A well-formed token for a user that was never created.
        let token = auth.issue_token("ghost").unwrap();
        assert!(matches!(
            accounts.authenticate(&token).await.unwrap_err(),
            ApiError::UnknownSubject
        ));
    }

    #[tokio::test]
    async fn profile_patch_updates_name_only() {
        let accounts = accounts();
        let registered = accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let mut patch = UserPatch::default();
        patch.name = Some("Ada L.".to_string());
        let updated = accounts
            .update_profile(&registered.user.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.email, "ada@example.com");
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let accounts = accounts();
        let registered = accounts
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let doc = accounts
            .store
            .find_by_id(Collection::Users, &registered.user.id)
            .await
            .unwrap()
            .unwrap();
        let stored = doc["password"].as_str().unwrap();
        assert_ne!(stored, "hunter42");
        assert!(stored.starts_with("$2"));
    }
}
