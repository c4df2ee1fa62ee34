use std::sync::Arc;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use bytes::Bytes;
use tracing::error;

use crate::domain::user::{Session, UserProfile};
use crate::infra::auth::{AccountFields, AuthProvider};
use crate::infra::directory::UserDirectory;
use crate::infra::files::FileStore;
use crate::store::{Action, SocialStore};

#[derive(Debug, Clone)]
pub struct ProfilePicture {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct SignupFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub bio: Option<String>,
    pub profile_pic: Option<ProfilePicture>,
}

/// Account-creation failure carrying the banner message shown to the user.
/// This is the one flow whose errors are user-visible.
#[derive(Debug)]
pub struct SignupError {
    message: String,
}

impl SignupError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for SignupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SignupError {}

/// Signup and session lifecycle against the external auth service.
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    files: Arc<dyn FileStore>,
    directory: Arc<dyn UserDirectory>,
    store: SocialStore,
}

impl AccountService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        files: Arc<dyn FileStore>,
        directory: Arc<dyn UserDirectory>,
        store: SocialStore,
    ) -> Self {
        Self {
            auth,
            files,
            directory,
            store,
        }
    }

    /// Create the external account, then the profile document, then sign the
    /// new user in. Each step's failure surfaces as a banner message.
    pub async fn create_account(&self, fields: SignupFields) -> Result<Session, SignupError> {
        let session = self
            .auth
            .create_account(&AccountFields {
                name: fields.name.clone(),
                email: fields.email.clone(),
                password: fields.password.clone(),
            })
            .await
            .map_err(|err| {
                error!(error = ?err, "account creation failed");
                SignupError::new(err.to_string())
            })?;

        let password_hash = hash_password(&fields.password)?;

        let profile_pic_url = match fields.profile_pic {
            Some(picture) => {
                let file_ref = self
                    .files
                    .upload(&picture.filename, picture.bytes)
                    .await
                    .map_err(|err| {
                        error!(error = ?err, "profile picture upload failed");
                        SignupError::new(err.to_string())
                    })?;
                Some(self.files.preview_url(&file_ref))
            }
            None => None,
        };

        let profile = UserProfile {
            user_id: session.user_id.clone(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            password_hash: Some(password_hash),
            profile_pic_url,
            bio: fields.bio,
            notifications: Vec::new(),
        };
        self.directory.create_user(&profile).await.map_err(|err| {
            error!(error = ?err, user_id = %session.user_id, "profile creation failed");
            SignupError::new("There was an error creating your user profile.")
        })?;

        if let Some(stored) = self.fetch_profile(&session.user_id).await {
            self.store.dispatch(Action::SetUserData { profile: stored });
        }
        match self.auth.get_current_user().await {
            Ok(Some(current)) => self.store.dispatch(Action::Login { session: current }),
            Ok(None) => {}
            Err(err) => error!(error = ?err, "failed to read back session after signup"),
        }

        Ok(session)
    }

    /// Re-establish the session on startup, if the external service still has
    /// one.
    pub async fn restore_session(&self) {
        match self.auth.get_current_user().await {
            Ok(Some(session)) => {
                if let Some(profile) = self.fetch_profile(&session.user_id).await {
                    self.store.dispatch(Action::SetUserData { profile });
                }
                self.store.dispatch(Action::Login { session });
            }
            Ok(None) => {}
            Err(err) => error!(error = ?err, "failed to restore session"),
        }
    }

    pub async fn logout(&self) {
        if let Err(err) = self.auth.logout().await {
            error!(error = ?err, "failed to log out remotely");
        }
        self.store.dispatch(Action::Logout);
        self.store.dispatch(Action::ClearNotifications);
    }

    async fn fetch_profile(&self, user_id: &str) -> Option<UserProfile> {
        match self.directory.get_user_by_id(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                error!(error = ?err, user_id = %user_id, "failed to fetch profile");
                None
            }
        }
    }
}

fn hash_password(password: &str) -> Result<String, SignupError> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!(error = %err, "failed to hash password");
            SignupError::new("An error occurred during account creation.")
        })
}
