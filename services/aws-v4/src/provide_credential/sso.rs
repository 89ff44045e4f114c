// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use super::utils::{non_empty, profile_section, ProfileFile};
use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDateTime, TimeDelta};
use http::header::CONTENT_TYPE;
use http::{Method, Request, StatusCode};
use ini::Ini;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sigcurl_core::hash::hex_sha1;
use sigcurl_core::time::{format_rfc3339, now, parse_rfc3339, DateTime};
use sigcurl_core::{Context, Error, ProvideCredential, Result};
use std::path::PathBuf;

/// SSOCredentialProvider exchanges a cached IAM Identity Center (SSO) token
/// for temporary role credentials.
///
/// The token is the one written by `aws sso login` under `~/.aws/sso/cache/`.
/// Tokens of `sso-session` profiles that expire within 15 minutes are
/// refreshed through the SSO OIDC service when the cache carries a refresh
/// token and a live client registration. The refreshed token is written back
/// to the cache. A missing token, or an expired one that can't be refreshed,
/// is reported as
/// [`ErrorKind::CredentialExpired`](sigcurl_core::ErrorKind::CredentialExpired)
/// so that the caller can ask the user to log in again.
///
/// Both profile layouts are supported:
///
/// ```ini
/// [profile legacy]
/// sso_start_url = https://my-sso-portal.awsapps.com/start
/// sso_region = us-east-1
/// sso_account_id = 123456789012
/// sso_role_name = MyRole
///
/// [profile modern]
/// sso_session = my-sso
/// sso_account_id = 123456789012
/// sso_role_name = MyRole
///
/// [sso-session my-sso]
/// sso_start_url = https://my-sso-portal.awsapps.com/start
/// sso_region = us-east-1
/// ```
#[derive(Debug, Clone)]
pub struct SSOCredentialProvider {
    profile: String,
    config_file: Option<String>,
    endpoint: Option<String>,
    oidc_endpoint: Option<String>,
}

/// Remaining lifetime, in minutes, below which a token gets refreshed.
const REFRESH_WINDOW_MINUTES: i64 = 15;

impl Default for SSOCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SSOCredentialProvider {
    /// Create a new SSO credential provider for the `default` profile.
    pub fn new() -> Self {
        Self {
            profile: "default".to_string(),
            config_file: None,
            endpoint: None,
            oidc_endpoint: None,
        }
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set custom SSO portal endpoint, mostly for testing.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set custom SSO OIDC endpoint used to refresh tokens, mostly for testing.
    pub fn with_oidc_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.oidc_endpoint = Some(endpoint.into());
        self
    }

    async fn load_sso_config(&self, ctx: &Context) -> Result<Option<SSOConfig>> {
        let Some(conf) = ProfileFile::Config
            .load(ctx, self.config_file.as_deref())
            .await?
        else {
            return Ok(None);
        };

        SSOConfig::from_ini(&conf, &self.profile)
    }

    /// Load the access token of `config`, refreshing it when it is about to expire.
    async fn load_access_token(&self, ctx: &Context, config: &SSOConfig) -> Result<String> {
        let home_dir = ctx
            .home_dir()
            .ok_or_else(|| Error::config_invalid("home directory not found"))?;

        // The cache file name is the SHA1 of the session name, or of the
        // start url for legacy profiles.
        let cache_file = PathBuf::from(home_dir)
            .join(".aws")
            .join("sso")
            .join("cache")
            .join(format!("{}.json", hex_sha1(config.cache_key().as_bytes())));
        let cache_file = cache_file.to_string_lossy();
        debug!("looking for SSO token cache at: {cache_file}");

        let content = ctx.file_read(&cache_file).await.map_err(|err| {
            Error::credential_expired(format!("SSO token cache {cache_file} is not available"))
                .with_source(err)
        })?;

        let token: CachedToken = serde_json::from_slice(&content).map_err(|e| {
            Error::credential_invalid(format!("failed to parse SSO token cache {cache_file}"))
                .with_source(e)
        })?;

        let expires_at = parse_expires_at(&token.expires_at)?;
        let refresh_window = TimeDelta::minutes(REFRESH_WINDOW_MINUTES);
        if config.sso_session.is_some() && expires_at - now() < refresh_window {
            match self
                .refresh_token(ctx, config, &cache_file, &content, &token)
                .await
            {
                Ok(Some(access_token)) => return Ok(access_token),
                Ok(None) => {}
                Err(err) => warn!("failed to refresh SSO token: {err:?}"),
            }
        }

        if expires_at <= now() {
            warn!("SSO token expired at {}", format_rfc3339(expires_at));
            return Err(Error::credential_expired(format!(
                "SSO token expired at {}",
                format_rfc3339(expires_at)
            )));
        }

        Ok(token.access_token)
    }

    /// Exchange the refresh token of a cached token for a new access token.
    ///
    /// Returns `Ok(None)` when the cache doesn't allow a refresh.
    async fn refresh_token(
        &self,
        ctx: &Context,
        config: &SSOConfig,
        cache_file: &str,
        content: &[u8],
        token: &CachedToken,
    ) -> Result<Option<String>> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            token.refresh_token.as_deref(),
            token.client_id.as_deref(),
            token.client_secret.as_deref(),
        ) else {
            debug!("SSO token cache {cache_file} has no refresh token");
            return Ok(None);
        };
        if let Some(registration_expires_at) = &token.registration_expires_at {
            if parse_expires_at(registration_expires_at)? <= now() {
                debug!("SSO client registration expired at {registration_expires_at}");
                return Ok(None);
            }
        }

        let endpoint = self
            .oidc_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://oidc.{}.amazonaws.com", config.sso_region));
        let body = serde_json::to_vec(&CreateTokenRequest {
            grant_type: "refresh_token",
            client_id,
            client_secret,
            refresh_token,
        })
        .map_err(|e| Error::unexpected("failed to encode SSO token request").with_source(e))?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("{endpoint}/token"))
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))?;
        let resp = ctx.http_send(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::unexpected(format!(
                "SSO OIDC returned status {}: {}",
                resp.status(),
                String::from_utf8_lossy(resp.body())
            )));
        }

        let created: CreateTokenResponse = serde_json::from_slice(resp.body())
            .map_err(|e| Error::unexpected("failed to parse SSO token response").with_source(e))?;
        let expires_in = TimeDelta::try_seconds(created.expires_in)
            .ok_or_else(|| Error::unexpected("invalid SSO token lifetime"))?;
        let expires_at = format_rfc3339(now() + expires_in).to_string();
        debug!("refreshed SSO token, now valid until {expires_at}");

        // Keep every other field of the cache as the CLI wrote it.
        let mut cache: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(content)
            .map_err(|e| Error::unexpected("failed to parse SSO token cache").with_source(e))?;
        cache.insert("accessToken".to_string(), created.access_token.clone().into());
        cache.insert("expiresAt".to_string(), expires_at.into());
        if let Some(refresh_token) = created.refresh_token {
            cache.insert("refreshToken".to_string(), refresh_token.into());
        }
        match serde_json::to_vec(&cache) {
            Ok(updated) => {
                if let Err(err) = ctx.file_write(cache_file, &updated).await {
                    warn!("failed to update SSO token cache {cache_file}: {err:?}");
                }
            }
            Err(err) => warn!("failed to encode SSO token cache: {err:?}"),
        }

        Ok(Some(created.access_token))
    }

    async fn get_role_credentials(
        &self,
        ctx: &Context,
        config: &SSOConfig,
        access_token: &str,
    ) -> Result<Credential> {
        let endpoint = self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://portal.sso.{}.amazonaws.com/federation/credentials",
                config.sso_region
            )
        });

        let params = serde_urlencoded::to_string([
            ("role_name", &config.sso_role_name),
            ("account_id", &config.sso_account_id),
        ])
        .map_err(|e| Error::unexpected("failed to encode SSO query params").with_source(e))?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(format!("{endpoint}?{params}"))
            .header(X_AMZ_SSO_BEARER_TOKEN, access_token)
            .body(Bytes::new())?;

        let resp = ctx.http_send(req).await?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::credential_expired(format!(
                    "SSO portal rejected the cached token: {}",
                    resp.status()
                )));
            }
            status => {
                return Err(Error::unexpected(format!(
                    "SSO portal returned status {status}: {}",
                    String::from_utf8_lossy(resp.body())
                )));
            }
        }

        let creds: SSOCredentialResponse = serde_json::from_slice(resp.body())
            .map_err(|e| Error::unexpected("failed to parse SSO credentials").with_source(e))?;

        let role_creds = creds.role_credentials;
        let expires_in = DateTime::from_timestamp_millis(role_creds.expiration)
            .ok_or_else(|| Error::unexpected("invalid SSO credential expiration"))?;

        Ok(Credential {
            access_key_id: role_creds.access_key_id,
            secret_access_key: role_creds.secret_access_key,
            session_token: Some(role_creds.session_token),
            expires_in: Some(expires_in),
        })
    }
}

#[async_trait]
impl ProvideCredential for SSOCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(config) = self.load_sso_config(ctx).await? else {
            debug!("profile {} has no SSO configuration", self.profile);
            return Ok(None);
        };

        debug!(
            "SSO config loaded: account={}, role={}",
            config.sso_account_id, config.sso_role_name
        );

        let access_token = self.load_access_token(ctx, &config).await?;
        let cred = self
            .get_role_credentials(ctx, &config, &access_token)
            .await?;

        Ok(Some(cred))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SSOConfig {
    sso_session: Option<String>,
    sso_start_url: String,
    sso_region: String,
    sso_account_id: String,
    sso_role_name: String,
}

impl SSOConfig {
    fn from_ini(conf: &Ini, profile: &str) -> Result<Option<Self>> {
        let Some(props) = profile_section(conf, ProfileFile::Config, profile) else {
            return Ok(None);
        };

        let missing = |key: &str| {
            Error::config_invalid(format!("profile {profile} is missing {key} for SSO"))
        };

        let (sso_session, sso_start_url, sso_region) =
            if let Some(session) = non_empty(props, SSO_SESSION_KEY) {
                let section = conf
                    .section(Some(format!("sso-session {session}")))
                    .ok_or_else(|| {
                        Error::config_invalid(format!(
                            "sso-session {session} referenced by profile {profile} not found"
                        ))
                    })?;
                let start_url =
                    non_empty(section, SSO_START_URL_KEY).ok_or_else(|| missing(SSO_START_URL_KEY))?;
                let region = non_empty(section, SSO_REGION_KEY)
                    .or_else(|| non_empty(props, SSO_REGION_KEY))
                    .ok_or_else(|| missing(SSO_REGION_KEY))?;
                (Some(session), start_url, region)
            } else if let Some(start_url) = non_empty(props, SSO_START_URL_KEY) {
                let region = non_empty(props, SSO_REGION_KEY).ok_or_else(|| missing(SSO_REGION_KEY))?;
                (None, start_url, region)
            } else {
                return Ok(None);
            };

        Ok(Some(SSOConfig {
            sso_session: sso_session.map(|v| v.to_string()),
            sso_start_url: sso_start_url.to_string(),
            sso_region: sso_region.to_string(),
            sso_account_id: non_empty(props, SSO_ACCOUNT_ID_KEY)
                .ok_or_else(|| missing(SSO_ACCOUNT_ID_KEY))?
                .to_string(),
            sso_role_name: non_empty(props, SSO_ROLE_NAME_KEY)
                .ok_or_else(|| missing(SSO_ROLE_NAME_KEY))?
                .to_string(),
        }))
    }

    fn cache_key(&self) -> &str {
        self.sso_session.as_deref().unwrap_or(&self.sso_start_url)
    }
}

/// Parse `expiresAt` of a cached token.
///
/// Newer CLIs write RFC3339, older ones wrote `2019-11-14T04:05:45UTC`.
fn parse_expires_at(s: &str) -> Result<DateTime> {
    if let Some(naive) = s.strip_suffix("UTC") {
        return NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S")
            .map(|v| v.and_utc())
            .map_err(|e| {
                Error::credential_invalid(format!("failed to parse SSO token expiry {s}"))
                    .with_source(e)
            });
    }

    parse_rfc3339(s).map_err(|e| {
        Error::credential_invalid(format!("failed to parse SSO token expiry {s}")).with_source(e)
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedToken {
    access_token: String,
    expires_at: String,
    refresh_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    registration_expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SSOCredentialResponse {
    role_credentials: RoleCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: i64,
}
