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

use sigcurl_core::ErrorKind;

/// Everything that can stop a run after the arguments were parsed.
///
/// Usage errors never reach this type: clap reports them and exits with 2.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The profile yields no usable static or SSO credentials.
    #[error("Could not load AWS credentials for profile '{profile}'.")]
    CredentialsUnavailable {
        profile: String,
        #[source]
        source: Option<sigcurl_core::Error>,
    },

    /// The profile is backed by an SSO session that has to be renewed.
    #[error(
        "AWS SSO session has expired or is not available for profile '{profile}'.\n\
         Please run: aws sso login --profile {profile}"
    )]
    SessionExpired {
        profile: String,
        #[source]
        source: Option<sigcurl_core::Error>,
    },

    #[error("Region not found in profile '{profile}'. Please set it up.")]
    RegionMissing {
        profile: String,
        #[source]
        source: Option<sigcurl_core::Error>,
    },

    #[error("failed to sign request")]
    Signing(#[source] sigcurl_core::Error),

    #[error("failed to send request to {location}")]
    Transport {
        location: String,
        #[source]
        source: sigcurl_core::Error,
    },

    #[error("failed to write response")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Classify an error returned by the credential providers of `profile`.
    pub fn from_credential_error(profile: &str, err: sigcurl_core::Error) -> Self {
        match err.kind() {
            ErrorKind::CredentialExpired => Error::SessionExpired {
                profile: profile.to_string(),
                source: Some(err),
            },
            _ => Error::CredentialsUnavailable {
                profile: profile.to_string(),
                source: Some(err),
            },
        }
    }
}
