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

use clap::Parser;
use http::uri::Scheme;
use http::Uri;

/// Send a SigV4 signed GET request to an AWS-fronted HTTP endpoint.
///
/// Credentials and region come from the named profile of the shared AWS
/// config and credentials files, including IAM Identity Center (SSO) profiles
/// that were logged in with `aws sso login`.
#[derive(Parser, Debug, Clone)]
#[command(name = "sigcurl")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Profile name in the shared AWS config and credentials files
    #[arg(long)]
    pub profile: String,

    /// Absolute http(s) URL to GET
    #[arg(long, value_parser = parse_location)]
    pub location: Uri,

    /// Print the response body verbatim instead of pretty-printing JSON
    #[arg(long)]
    pub raw: bool,
}

fn parse_location(s: &str) -> Result<Uri, String> {
    let uri: Uri = s.parse().map_err(|e| format!("invalid URL: {e}"))?;

    match uri.scheme() {
        Some(scheme) if *scheme == Scheme::HTTP || *scheme == Scheme::HTTPS => {}
        _ => return Err("URL must start with http:// or https://".to_string()),
    }
    if uri.authority().is_none() {
        return Err("URL must contain a host".to_string());
    }

    Ok(uri)
}
