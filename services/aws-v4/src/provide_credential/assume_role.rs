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

use super::utils::{non_empty, profile_section, sts_endpoint, ProfileFile};
use crate::constants::*;
use crate::provide_credential::{DefaultCredentialProvider, ProfileCredentialProvider};
use crate::{Credential, RegionLoader, RequestSigner};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use ini::Properties;
use log::debug;
use quick_xml::de;
use serde::Deserialize;
use sigcurl_core::time::{now, parse_rfc3339};
use sigcurl_core::{Context, Error, ProvideCredential, Result, SignRequest};

/// AssumeRoleCredentialProvider assumes the role configured for a profile.
///
/// The profile names the role and the profile holding the credentials used
/// to call STS:
///
/// ```ini
/// [profile deploy]
/// role_arn = arn:aws:iam::123456789012:role/Deploy
/// source_profile = base
/// region = eu-west-1
/// ```
///
/// The source profile is resolved with the full default chain, so it may be
/// a static, SSO or another role profile. A profile that names itself as its
/// source uses its own static keys. `credential_source` and `mfa_serial` are
/// rejected as unsupported.
#[derive(Debug)]
pub struct AssumeRoleCredentialProvider {
    profile: String,
    endpoint: Option<String>,
    visited: Vec<String>,
}

impl Default for AssumeRoleCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AssumeRoleCredentialProvider {
    /// Create a new assume role provider for the `default` profile.
    pub fn new() -> Self {
        Self {
            profile: "default".to_string(),
            endpoint: None,
            visited: Vec::new(),
        }
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set custom STS endpoint, mostly for testing.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Profiles already being resolved higher up the source chain.
    pub(crate) fn with_visited(mut self, visited: Vec<String>) -> Self {
        self.visited = visited;
        self
    }

    async fn load_role_config(&self, ctx: &Context) -> Result<Option<RoleConfig>> {
        for file in [ProfileFile::Config, ProfileFile::Credentials] {
            let Some(conf) = file.load(ctx, None).await? else {
                continue;
            };
            let Some(props) = profile_section(&conf, file, &self.profile) else {
                continue;
            };
            if let Some(role) = RoleConfig::from_props(props, &self.profile)? {
                return Ok(Some(role));
            }
        }

        Ok(None)
    }

    async fn load_source_credential(&self, ctx: &Context, role: &RoleConfig) -> Result<Credential> {
        let source = &role.source_profile;
        let cred = if *source == self.profile {
            ProfileCredentialProvider::new()
                .with_profile(source)
                .provide_credential(ctx)
                .await?
        } else {
            if self.visited.contains(source) {
                return Err(Error::config_invalid(format!(
                    "source_profile cycle detected: {} -> {}",
                    self.visited.join(" -> "),
                    self.profile
                )));
            }

            let mut visited = self.visited.clone();
            visited.push(self.profile.clone());
            DefaultCredentialProvider::for_source(source, visited)
                .provide_credential(ctx)
                .await?
        };

        cred.ok_or_else(|| {
            Error::config_invalid(format!(
                "source_profile {source} of profile {} has no credentials",
                self.profile
            ))
        })
    }

    async fn assume_role(
        &self,
        ctx: &Context,
        role: &RoleConfig,
        source: &Credential,
    ) -> Result<Credential> {
        let region = RegionLoader::new()
            .with_profile(&self.profile)
            .load(ctx)
            .await?;
        let (host, signing_region) = sts_endpoint(region.as_deref(), role.use_regional_endpoint);
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{host}"));

        let mut params = vec![
            ("Action", "AssumeRole".to_string()),
            ("Version", "2011-06-15".to_string()),
            ("RoleArn", role.role_arn.clone()),
            ("RoleSessionName", role.role_session_name.clone()),
        ];
        if let Some(external_id) = &role.external_id {
            params.push(("ExternalId", external_id.clone()));
        }
        if let Some(duration_seconds) = role.duration_seconds {
            params.push(("DurationSeconds", duration_seconds.to_string()));
        }
        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| Error::unexpected("failed to encode AssumeRole query").with_source(e))?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(format!("{endpoint}/?{query}"))
            .body(Bytes::new())?;
        let (mut parts, body) = req.into_parts();
        RequestSigner::new(STS_SERVICE, &signing_region)
            .sign_request(ctx, &mut parts, Some(source))
            .await?;
        let req = Request::from_parts(parts, body);

        debug!("assuming role {} via {endpoint}", role.role_arn);
        let resp = ctx.http_send(req).await?;
        match resp.status() {
            StatusCode::OK => {}
            StatusCode::FORBIDDEN => {
                return Err(Error::credential_denied(format!(
                    "STS refused to assume role {}: {}",
                    role.role_arn,
                    String::from_utf8_lossy(resp.body())
                )));
            }
            status => {
                return Err(Error::unexpected(format!(
                    "STS returned status {status}: {}",
                    String::from_utf8_lossy(resp.body())
                )));
            }
        }

        let body = String::from_utf8_lossy(resp.body());
        let resp: AssumeRoleResponse = de::from_str(&body).map_err(|e| {
            Error::unexpected("failed to parse STS AssumeRole response").with_source(e)
        })?;
        let resp_cred = resp.result.credentials;

        Ok(Credential {
            access_key_id: resp_cred.access_key_id.trim().to_string(),
            secret_access_key: resp_cred.secret_access_key.trim().to_string(),
            session_token: Some(resp_cred.session_token.trim().to_string()),
            expires_in: Some(parse_rfc3339(resp_cred.expiration.trim())?),
        })
    }
}

#[async_trait]
impl ProvideCredential for AssumeRoleCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(role) = self.load_role_config(ctx).await? else {
            debug!("profile {} has no role to assume", self.profile);
            return Ok(None);
        };

        let source = self.load_source_credential(ctx, &role).await?;
        let cred = self.assume_role(ctx, &role, &source).await?;
        Ok(Some(cred))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct RoleConfig {
    role_arn: String,
    source_profile: String,
    role_session_name: String,
    external_id: Option<String>,
    duration_seconds: Option<u32>,
    use_regional_endpoint: bool,
}

impl RoleConfig {
    fn from_props(props: &Properties, profile: &str) -> Result<Option<Self>> {
        let Some(role_arn) = non_empty(props, ROLE_ARN_KEY) else {
            return Ok(None);
        };

        for unsupported in [CREDENTIAL_SOURCE_KEY, MFA_SERIAL_KEY] {
            if non_empty(props, unsupported).is_some() {
                return Err(Error::config_invalid(format!(
                    "profile {profile} uses {unsupported}, which is not supported"
                )));
            }
        }

        let source_profile = non_empty(props, SOURCE_PROFILE_KEY).ok_or_else(|| {
            Error::config_invalid(format!(
                "profile {profile} sets role_arn without source_profile"
            ))
        })?;

        let duration_seconds = non_empty(props, DURATION_SECONDS_KEY)
            .map(|v| {
                v.parse::<u32>().map_err(|e| {
                    Error::config_invalid(format!(
                        "profile {profile} has invalid duration_seconds {v}"
                    ))
                    .with_source(e)
                })
            })
            .transpose()?;

        Ok(Some(RoleConfig {
            role_arn: role_arn.to_string(),
            source_profile: source_profile.to_string(),
            role_session_name: non_empty(props, ROLE_SESSION_NAME_KEY)
                .map(|v| v.to_string())
                .unwrap_or_else(|| format!("sigcurl-session-{}", now().timestamp())),
            external_id: non_empty(props, EXTERNAL_ID_KEY).map(|v| v.to_string()),
            duration_seconds,
            use_regional_endpoint: non_empty(props, STS_REGIONAL_ENDPOINTS_KEY) != Some("legacy"),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleResponse {
    #[serde(rename = "AssumeRoleResult")]
    result: AssumeRoleResult,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: AssumeRoleCredentials,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: String,
}
