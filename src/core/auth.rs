//! Authorization system for medstock
//!
//! Identity is an external concern. The service only asks an [`AuthProvider`]
//! who the caller is. Every data route requires an authenticated caller.
//! Three providers ship with the crate:
//! - [`DemoAuthProvider`]: a fixed, configured identity for development
//! - [`TrustedHeaderAuthProvider`]: identity asserted by an upstream gateway
//! - [`NoAuthProvider`]: nobody is ever authenticated

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated user within the NGO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Coordinator,
    Volunteer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Coordinator => "coordinator",
            UserRole::Volunteer => "volunteer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "coordinator" => Ok(UserRole::Coordinator),
            "volunteer" => Ok(UserRole::Volunteer),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl User {
    /// The identity used when running in demo mode
    pub fn demo() -> Self {
        Self {
            id: "demo-user-id".to_string(),
            name: "Demo Admin".to_string(),
            email: "admin@jsf.org".to_string(),
            role: UserRole::Admin,
            location: None,
        }
    }
}

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Authenticated user
    User(User),

    /// No authentication
    Anonymous,
}

impl AuthContext {
    /// Get the user if authenticated
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthContext::User(user) => Some(user),
            AuthContext::Anonymous => None,
        }
    }
}

/// Failures while resolving the caller's identity
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing identity header '{0}'")]
    MissingHeader(&'static str),

    #[error("identity header '{0}' is not valid UTF-8")]
    MalformedHeader(&'static str),

    #[error("unknown user role '{0}'")]
    InvalidRole(String),
}

/// Trait for auth providers
///
/// `current_user` answers "who is calling?". It never verifies credentials
/// itself; that belongs to whatever sits in front of the service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from the request headers
    async fn current_user(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError>;
}

/// Fixed identity for local development and demos
pub struct DemoAuthProvider {
    user: User,
}

impl DemoAuthProvider {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

impl Default for DemoAuthProvider {
    fn default() -> Self {
        Self::new(User::demo())
    }
}

#[async_trait]
impl AuthProvider for DemoAuthProvider {
    async fn current_user(&self, _headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        Ok(AuthContext::User(self.user.clone()))
    }
}

/// Identity asserted by a trusted gateway through request headers
///
/// Requests without `X-User-Id` are anonymous. When the id is present,
/// `X-User-Email` is required and `X-User-Role` defaults to volunteer.
pub struct TrustedHeaderAuthProvider;

impl TrustedHeaderAuthProvider {
    pub const USER_ID: &'static str = "x-user-id";
    pub const USER_EMAIL: &'static str = "x-user-email";
    pub const USER_NAME: &'static str = "x-user-name";
    pub const USER_ROLE: &'static str = "x-user-role";
}

fn header_value<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<Option<&'a str>, AuthError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| AuthError::MalformedHeader(name)),
    }
}

#[async_trait]
impl AuthProvider for TrustedHeaderAuthProvider {
    async fn current_user(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let Some(id) = header_value(headers, Self::USER_ID)? else {
            return Ok(AuthContext::Anonymous);
        };
        let email = header_value(headers, Self::USER_EMAIL)?
            .ok_or(AuthError::MissingHeader(Self::USER_EMAIL))?;
        let name = header_value(headers, Self::USER_NAME)?.unwrap_or(email);
        let role = match header_value(headers, Self::USER_ROLE)? {
            Some(role) => role.parse()?,
            None => UserRole::Volunteer,
        };

        Ok(AuthContext::User(User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            location: None,
        }))
    }
}

/// Provider that never authenticates anyone
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn current_user(&self, _headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        Ok(AuthContext::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_serializes_camel_case_role() {
        let value = serde_json::to_value(User::demo()).unwrap();
        assert_eq!(value["role"], "admin");
        assert_eq!(value["id"], "demo-user-id");
        assert!(value.get("location").is_none());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Coordinator".parse::<UserRole>().unwrap(), UserRole::Coordinator);
        assert!(matches!(
            "janitor".parse::<UserRole>(),
            Err(AuthError::InvalidRole(_))
        ));
    }

    #[tokio::test]
    async fn test_demo_provider_returns_configured_user() {
        let provider = DemoAuthProvider::default();
        let ctx = provider.current_user(&HeaderMap::new()).await.unwrap();
        assert_eq!(ctx.user().map(|u| u.id.as_str()), Some("demo-user-id"));
    }

    #[tokio::test]
    async fn test_no_auth_provider_is_anonymous() {
        let ctx = NoAuthProvider.current_user(&HeaderMap::new()).await.unwrap();
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_trusted_headers_without_id_is_anonymous() {
        let ctx = TrustedHeaderAuthProvider
            .current_user(&HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_trusted_headers_build_user() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u-42"));
        headers.insert("x-user-email", HeaderValue::from_static("priya@jsf.org"));
        headers.insert("x-user-role", HeaderValue::from_static("coordinator"));

        let ctx = TrustedHeaderAuthProvider.current_user(&headers).await.unwrap();
        let user = ctx.user().unwrap();
        assert_eq!(user.id, "u-42");
        assert_eq!(user.name, "priya@jsf.org");
        assert_eq!(user.role, UserRole::Coordinator);
    }

    #[tokio::test]
    async fn test_trusted_headers_require_email() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u-42"));

        let err = TrustedHeaderAuthProvider
            .current_user(&headers)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingHeader("x-user-email")));
    }
}
