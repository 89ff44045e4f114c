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

use crate::provide_credential::{
    AssumeRoleCredentialProvider, ProfileCredentialProvider, SSOCredentialProvider,
};
use crate::Credential;
use async_trait::async_trait;
use sigcurl_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider resolves credentials for an explicitly named profile.
///
/// Resolution order:
///
/// 1. A role assumed with the credentials of `source_profile`
/// 2. Static keys in the shared files (`~/.aws/credentials`, `~/.aws/config`)
/// 3. SSO credentials backed by the `aws sso login` token cache
///
/// Environment access keys are not consulted: naming a profile means using it.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` for the `default` profile.
    pub fn new() -> Self {
        Self::with_profile("default")
    }

    /// Create a new `DefaultCredentialProvider` for the given profile.
    pub fn with_profile(profile: &str) -> Self {
        Self::for_source(profile, Vec::new())
    }

    /// Chain for a profile reached through `source_profile` of the `visited` ones.
    pub(crate) fn for_source(profile: &str, visited: Vec<String>) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(
                AssumeRoleCredentialProvider::new()
                    .with_profile(profile)
                    .with_visited(visited),
            )
            .push(ProfileCredentialProvider::new().with_profile(profile))
            .push(SSOCredentialProvider::new().with_profile(profile));

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
