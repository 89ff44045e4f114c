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

//! Helpers shared by everything that reads the AWS profile store.

use crate::constants::{AWS_CONFIG_FILE, AWS_SHARED_CREDENTIALS_FILE};
use ini::{Ini, Properties};
use log::debug;
use sigcurl_core::{Context, Error, Result};

/// Which of the two shared files to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProfileFile {
    /// `~/.aws/config`, sections named `[profile <name>]` except `[default]`.
    Config,
    /// `~/.aws/credentials`, sections named `[<name>]`.
    Credentials,
}

impl ProfileFile {
    fn env_key(self) -> &'static str {
        match self {
            ProfileFile::Config => AWS_CONFIG_FILE,
            ProfileFile::Credentials => AWS_SHARED_CREDENTIALS_FILE,
        }
    }

    fn default_path(self) -> &'static str {
        match self {
            ProfileFile::Config => "~/.aws/config",
            ProfileFile::Credentials => "~/.aws/credentials",
        }
    }

    /// Section name that holds `profile` in this file.
    pub(crate) fn section_name(self, profile: &str) -> String {
        match (self, profile) {
            (ProfileFile::Credentials, x) => x.to_string(),
            (ProfileFile::Config, "default") => "default".to_string(),
            (ProfileFile::Config, x) => format!("profile {x}"),
        }
    }

    /// Resolve the path of this file.
    ///
    /// Order: explicit override, then the env var, then the default location.
    pub(crate) fn path(self, ctx: &Context, overridden: Option<&str>) -> Option<String> {
        let path = overridden
            .map(|v| v.to_string())
            .or_else(|| ctx.env_var(self.env_key()))
            .unwrap_or_else(|| self.default_path().to_string());

        let expanded = ctx.expand_home_dir(&path);
        if expanded.is_none() {
            debug!("failed to expand homedir for path: {path}");
        }
        expanded
    }

    /// Load and parse this file.
    ///
    /// Returns `Ok(None)` when the file can't be read, an error when it can be
    /// read but not parsed.
    pub(crate) async fn load(self, ctx: &Context, overridden: Option<&str>) -> Result<Option<Ini>> {
        let Some(path) = self.path(ctx, overridden) else {
            return Ok(None);
        };

        let content = match ctx.file_read_as_string(&path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read {self:?} file {path}: {err:?}");
                return Ok(None);
            }
        };

        Ini::load_from_str(&content).map(Some).map_err(|e| {
            Error::config_invalid(format!("failed to parse {self:?} file {path}")).with_source(e)
        })
    }
}

/// Get the section of `profile` from a loaded file.
pub(crate) fn profile_section<'a>(
    conf: &'a Ini,
    file: ProfileFile,
    profile: &str,
) -> Option<&'a Properties> {
    let section = conf.section(Some(file.section_name(profile)));
    if section.is_none() {
        debug!("profile {profile} not found in {file:?} file");
    }
    section
}

/// Get a non-empty value out of a section.
pub(crate) fn non_empty<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Get the STS endpoint and the region its requests are signed for.
///
/// The global endpoint lives in `us-east-1`.
pub(crate) fn sts_endpoint(region: Option<&str>, use_regional: bool) -> (String, String) {
    match region {
        Some(region) if use_regional => {
            let endpoint = if region.starts_with("cn-") {
                format!("sts.{region}.amazonaws.com.cn")
            } else {
                format!("sts.{region}.amazonaws.com")
            };
            (endpoint, region.to_string())
        }
        _ => ("sts.amazonaws.com".to_string(), "us-east-1".to_string()),
    }
}
