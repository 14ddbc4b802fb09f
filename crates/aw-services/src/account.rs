//! The Account service: the user behind the current session.

use tracing::instrument;

use appwrite_client::path::fill;
use appwrite_client::{Client, Headers, Params, RequestMethod, ResponseType, Result};

use crate::models::{Jwt, Session, User};
use crate::{json_headers, require, with_list};

/// Account API.
#[derive(Debug, Clone)]
pub struct Account {
    client: Client,
}

impl Account {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// Get the currently logged in user.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<User> {
        self.client
            .call(
                RequestMethod::Get,
                "/account",
                Headers::new(),
                Params::new(),
                ResponseType::Json,
            )
            .await?
            .json()
    }

    /// Log in with an email and password.
    #[instrument(skip(self, password))]
    pub async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        require("email", email)?;
        require("password", password)?;

        let params = Params::new()
            .with("email", email)
            .with("password", password);

        self.client
            .call(
                RequestMethod::Post,
                "/account/sessions/email",
                json_headers(),
                params,
                ResponseType::Json,
            )
            .await?
            .json()
    }

    /// Create a JWT for the current session.
    #[instrument(skip(self))]
    pub async fn create_jwt(&self) -> Result<Jwt> {
        self.client
            .call(
                RequestMethod::Post,
                "/account/jwts",
                json_headers(),
                Params::new(),
                ResponseType::Json,
            )
            .await?
            .json()
    }

    /// Start an OAuth2 login and return the provider URL to redirect to.
    ///
    /// The server answers with a redirect; it is not followed.
    #[instrument(skip(self))]
    pub async fn create_oauth2_token(
        &self,
        provider: &str,
        success: Option<&str>,
        failure: Option<&str>,
        scopes: Option<&[String]>,
    ) -> Result<String> {
        require("provider", provider)?;

        let path = fill("/account/tokens/oauth2/{provider}", &[("provider", provider)])?;
        let params = Params::new()
            .with_opt("success", success)
            .with_opt("failure", failure);
        let params = with_list(params, "scopes", scopes);

        let response = self
            .client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                params,
                ResponseType::Location,
            )
            .await?;
        response.json()
    }

    /// Log out of a session. Use `current` for the session in use.
    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        require("sessionId", session_id)?;

        let path = fill("/account/sessions/{sessionId}", &[("sessionId", session_id)])?;
        self.client
            .call(
                RequestMethod::Delete,
                &path,
                json_headers(),
                Params::new(),
                ResponseType::Json,
            )
            .await?;
        Ok(())
    }
}
