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
use ini::Properties;
use log::{debug, warn};
use sigcurl_core::{Context, ProvideCredential, Result};

/// ProfileCredentialProvider loads static AWS credentials from the shared files.
///
/// This provider loads credentials from:
/// - `~/.aws/credentials` (or the path specified by `AWS_SHARED_CREDENTIALS_FILE`)
/// - `~/.aws/config` (or the path specified by `AWS_CONFIG_FILE`)
///
/// The credentials file wins when both carry keys for the profile. The profile
/// defaults to `default` and is never taken from `AWS_PROFILE`: the caller
/// names it explicitly.
#[derive(Debug)]
pub struct ProfileCredentialProvider {
    profile: String,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

impl Default for ProfileCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self {
            profile: "default".to_string(),
            config_file: None,
            credentials_file: None,
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

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    async fn load_from(
        &self,
        ctx: &Context,
        file: ProfileFile,
        overridden: Option<&str>,
    ) -> Result<Option<Credential>> {
        let Some(conf) = file.load(ctx, overridden).await? else {
            return Ok(None);
        };
        let Some(props) = profile_section(&conf, file, &self.profile) else {
            return Ok(None);
        };

        let cred = static_credential(props);
        if cred.is_none() && non_empty(props, CREDENTIAL_PROCESS_KEY).is_some() {
            warn!(
                "profile {} uses credential_process, which is not supported",
                self.profile
            );
        }
        Ok(cred)
    }
}

fn static_credential(props: &Properties) -> Option<Credential> {
    let access_key_id = non_empty(props, AWS_ACCESS_KEY_ID_KEY)?;
    let secret_access_key = non_empty(props, AWS_SECRET_ACCESS_KEY_KEY)?;

    Some(Credential {
        access_key_id: access_key_id.to_string(),
        secret_access_key: secret_access_key.to_string(),
        session_token: non_empty(props, AWS_SESSION_TOKEN_KEY).map(|s| s.to_string()),
        expires_in: None,
    })
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if let Some(cred) = self
            .load_from(ctx, ProfileFile::Credentials, self.credentials_file.as_deref())
            .await?
        {
            debug!("loaded static credential for profile {} from credentials file", self.profile);
            return Ok(Some(cred));
        }

        let cred = self
            .load_from(ctx, ProfileFile::Config, self.config_file.as_deref())
            .await?;
        if cred.is_some() {
            debug!("loaded static credential for profile {} from config file", self.profile);
        }
        Ok(cred)
    }
}
