// Session authentication
//
// Cookie-based login/logout. The login endpoint sets a session cookie in
// the client's jar; every later request carries it automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, warn};

use crate::client::{ReportsClient, error_message};
use crate::error::Error;

const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";

impl ReportsClient {
    /// Authenticate with username/password.
    ///
    /// On success the session cookie is stored in the client's cookie jar.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url(LOGIN_PATH)?;
        debug!(%url, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = error_message(&body).unwrap_or_else(|| format!("HTTP {status}"));
            return Err(Error::Authentication {
                message: format!("login failed: {detail}"),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// A failed logout is logged and otherwise ignored; the cookie jar is
    /// dropped with the client anyway.
    pub async fn logout(&self) {
        let url = match self.api_url(LOGOUT_PATH) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build logout URL");
                return;
            }
        };

        debug!(%url, "logging out");
        match self.http().post(url).send().await {
            Ok(resp) if resp.status().is_success() => debug!("logout complete"),
            Ok(resp) => warn!(status = %resp.status(), "logout rejected"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
    }
}
