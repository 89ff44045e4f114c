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

use crate::Error;
use async_trait::async_trait;
use log::debug;
use sigcurl_aws_v4::{Credential, DefaultCredentialProvider, RegionLoader};
use sigcurl_core::{Context, ProvideCredential, SigningCredential};
use std::fmt::Debug;

/// Credentials and region resolved for one profile.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// Credential used to sign the request.
    pub credential: Credential,
    /// Region that goes into the signing scope.
    pub region: String,
}

/// ResolveProfile turns a profile name into everything needed for signing.
///
/// Implementations return both a valid credential and a region, or an error
/// naming the profile.
#[async_trait]
pub trait ResolveProfile: Debug + Send + Sync {
    /// Resolve `profile` against the environment held by `ctx`.
    async fn resolve(&self, ctx: &Context, profile: &str) -> Result<ResolvedProfile, Error>;
}

/// Resolve profiles from the shared AWS config and credentials files.
///
/// Credentials come from [`DefaultCredentialProvider`], the region from
/// [`RegionLoader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileResolver;

#[async_trait]
impl ResolveProfile for ProfileResolver {
    async fn resolve(&self, ctx: &Context, profile: &str) -> Result<ResolvedProfile, Error> {
        let credential = DefaultCredentialProvider::with_profile(profile)
            .provide_credential(ctx)
            .await
            .map_err(|err| Error::from_credential_error(profile, err))?
            .ok_or_else(|| Error::CredentialsUnavailable {
                profile: profile.to_string(),
                source: None,
            })?;

        if !credential.is_valid() {
            debug!("credential of profile {profile} is not valid: {credential:?}");
            return Err(match credential.expires_in {
                Some(_) => Error::SessionExpired {
                    profile: profile.to_string(),
                    source: None,
                },
                None => Error::CredentialsUnavailable {
                    profile: profile.to_string(),
                    source: None,
                },
            });
        }

        let region = RegionLoader::new()
            .with_profile(profile)
            .load(ctx)
            .await
            .map_err(|err| Error::RegionMissing {
                profile: profile.to_string(),
                source: Some(err),
            })?
            .ok_or_else(|| Error::RegionMissing {
                profile: profile.to_string(),
                source: None,
            })?;

        debug!("profile {profile} resolved with region {region}");
        Ok(ResolvedProfile { credential, region })
    }
}
