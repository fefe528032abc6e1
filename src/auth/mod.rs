//! Account creation and sign-in through an external identity provider.
//!
//! Only "who is signed in" matters to the rest of the crate; session
//! persistence is the provider's business.

pub mod firebase;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::utils::error::TutorResult;

#[cfg(not(target_arch = "wasm32"))]
pub use firebase::FirebaseAuth;
pub use firebase::parse_auth_response;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub id_token: String,
}

impl User {
    /// Display name when set, e-mail otherwise.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }

    /// Upper-cased first character of the display label.
    pub fn initial(&self) -> Option<char> {
        self.display_label()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}

pub trait IdentityProvider {
    fn sign_up(
        &mut self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = TutorResult<User>>;

    fn sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = TutorResult<User>>;

    fn sign_out(&mut self);

    fn current_user(&self) -> Option<&User>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}
