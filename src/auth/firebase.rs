//! Identity Toolkit (Firebase Authentication) REST client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::User;
use crate::utils::error::{TutorError, TutorResult};

#[cfg(not(target_arch = "wasm32"))]
use {
    super::IdentityProvider,
    crate::config::AuthConfig,
    std::time::Duration,
    tracing::info,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

/// Turn a raw accounts endpoint response into a signed-in user.
///
/// Provider errors look like `{"error": {"message": "EMAIL_EXISTS"}}`.
pub fn parse_auth_response(status: u16, body: &str) -> TutorResult<User> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("status {}", status));
        return Err(TutorError::auth(message));
    }

    let account: AccountResponse = serde_json::from_str(body)
        .map_err(|e| TutorError::auth(format!("unexpected response: {}", e)))?;
    Ok(User {
        uid: account.local_id,
        email: account.email,
        display_name: account.display_name,
        id_token: account.id_token,
    })
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FirebaseAuth {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    user: Option<User>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FirebaseAuth {
    pub fn new(config: &AuthConfig) -> TutorResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TutorError::config(format!(
                "no identity provider key (set {})",
                crate::config::ENV_AUTH_KEY
            ))
        })?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TutorError::config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            user: None,
        })
    }

    async fn call(&mut self, endpoint: &str, email: &str, password: &str) -> TutorResult<User> {
        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        let request = CredentialsRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self
            .http_client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| TutorError::auth(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TutorError::auth(e.to_string()))?;
        let user = parse_auth_response(status, &body)?;
        info!(uid = %user.uid, endpoint, "signed in");
        self.user = Some(user.clone());
        Ok(user)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl IdentityProvider for FirebaseAuth {
    async fn sign_up(&mut self, email: &str, password: &str) -> TutorResult<User> {
        self.call("signUp", email, password).await
    }

    async fn sign_in(&mut self, email: &str, password: &str) -> TutorResult<User> {
        self.call("signInWithPassword", email, password).await
    }

    fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!(uid = %user.uid, "signed out");
        }
    }

    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{"kind":"identitytoolkit#SignupNewUserResponse","localId":"abc",
                       "email":"ada@example.com","idToken":"tok","refreshToken":"r","expiresIn":"3600"}"#;
        let user = parse_auth_response(200, body).expect("user");
        assert_eq!(user.uid, "abc");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.display_name, None);
        assert_eq!(user.id_token, "tok");
    }

    #[test]
    fn test_parse_provider_error() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        let err = parse_auth_response(400, body).unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed: EMAIL_EXISTS");
    }

    #[test]
    fn test_parse_error_without_body() {
        let err = parse_auth_response(503, "").unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed: status 503");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_signed_out_by_default() {
        let config = AuthConfig {
            api_key: Some("k".into()),
            ..AuthConfig::default()
        };
        let mut auth = FirebaseAuth::new(&config).expect("client");
        assert!(!auth.is_authenticated());
        auth.sign_out();
        assert!(auth.current_user().is_none());
    }
}
