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

//! Region is loaded from the environment or from the profile's config section.

use crate::constants::{AWS_DEFAULT_REGION, REGION_KEY};
use crate::provide_credential::utils::{non_empty, profile_section, ProfileFile};
use log::debug;
use sigcurl_core::{Context, Result};

/// RegionLoader resolves the region for a profile.
///
/// Order:
///
/// 1. `AWS_DEFAULT_REGION`
/// 2. `region` in the profile's section of `~/.aws/config` (or `AWS_CONFIG_FILE`)
///
/// Empty values are treated as absent.
#[derive(Debug)]
pub struct RegionLoader {
    profile: String,
    config_file: Option<String>,
}

impl Default for RegionLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionLoader {
    /// Create a new region loader for the `default` profile.
    pub fn new() -> Self {
        Self {
            profile: "default".to_string(),
            config_file: None,
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

    /// Load region.
    pub async fn load(&self, ctx: &Context) -> Result<Option<String>> {
        if let Some(region) = ctx
            .env_var(AWS_DEFAULT_REGION)
            .filter(|v| !v.trim().is_empty())
        {
            debug!("region {region} loaded from {AWS_DEFAULT_REGION}");
            return Ok(Some(region.trim().to_string()));
        }

        let Some(conf) = ProfileFile::Config
            .load(ctx, self.config_file.as_deref())
            .await?
        else {
            return Ok(None);
        };

        let region = profile_section(&conf, ProfileFile::Config, &self.profile)
            .and_then(|props| non_empty(props, REGION_KEY))
            .map(|v| v.to_string());
        debug!("region for profile {} loaded from config file: {region:?}", self.profile);
        Ok(region)
    }
}
