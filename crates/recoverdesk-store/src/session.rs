//! Demonstration sign-in.
//!
//! Credentials are matched against two fixed accounts; this is a role switch
//! for the demo, not an authentication boundary. On success the profile and
//! a token are written to the `user` and `token` keys so that a later run
//! can restore the session.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use recoverdesk_shared::constants::{TOKEN_KEY, USER_KEY};
use recoverdesk_shared::{DeskError, DeskResult, Role};

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::models::UserProfile;

struct DemoAccount {
    email: &'static str,
    password: &'static str,
    role: Role,
    name: &'static str,
}

const DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        email: "admin@demo.com",
        password: "admin",
        role: Role::Admin,
        name: "Admin User",
    },
    DemoAccount {
        email: "agent@demo.com",
        password: "agent",
        role: Role::Agent,
        name: "Agent User",
    },
];

#[derive(Serialize)]
struct TokenClaims<'a> {
    email: &'a str,
    role: Role,
}

pub struct Session {
    kv: Arc<dyn KeyValueStore>,
    user: Mutex<Option<UserProfile>>,
}

impl Session {
    /// Pick up a previously signed-in user, if any. An unreadable or corrupt
    /// profile is treated as signed out.
    pub fn restore(kv: Arc<dyn KeyValueStore>) -> Self {
        let user = match kv.get(USER_KEY) {
            Ok(Some(json)) => serde_json::from_str::<UserProfile>(&json)
                .map_err(|e| warn!(error = %e, "ignoring corrupt stored profile"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "stored profile unreadable");
                None
            }
        };

        Self {
            kv,
            user: Mutex::new(user),
        }
    }

    pub fn login(&self, email: &str, password: &str) -> DeskResult<UserProfile> {
        let account = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.email == email.trim() && a.password == password)
            .ok_or_else(|| DeskError::validation("Invalid credentials"))?;

        let profile = UserProfile {
            email: account.email.to_string(),
            role: account.role,
            name: account.name.to_string(),
        };
        let claims = TokenClaims {
            email: account.email,
            role: account.role,
        };

        let profile_json = serde_json::to_string(&profile).map_err(StoreError::from)?;
        let claims_json = serde_json::to_string(&claims).map_err(StoreError::from)?;

        // Token last: a stored token always has a stored profile behind it.
        self.kv.set(USER_KEY, &profile_json)?;
        if let Err(e) = self.kv.set(TOKEN_KEY, &STANDARD.encode(claims_json)) {
            if let Err(cleanup) = self.kv.remove(USER_KEY) {
                warn!(error = %cleanup, "could not roll back stored profile");
            }
            return Err(e.into());
        }
        *self.user.lock() = Some(profile.clone());

        info!(email = %profile.email, role = %profile.role, "signed in");
        Ok(profile)
    }

    /// Sign out and wipe the whole key-value namespace.
    pub fn logout(&self) -> DeskResult<()> {
        self.kv.remove_all()?;
        if let Some(user) = self.user.lock().take() {
            info!(email = %user.email, "signed out");
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.user.lock().clone()
    }

    pub fn token(&self) -> DeskResult<Option<String>> {
        Ok(self.kv.get(TOKEN_KEY)?)
    }
}
