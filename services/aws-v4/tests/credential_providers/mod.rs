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

mod assume_role;
mod default;

use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode, Uri};
use sigcurl_core::{Context, HttpSend, StaticEnv};
use sigcurl_file_read_tokio::{TokioFileRead, TokioFileWrite};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// An SSO portal that answers every request with the same response and
/// remembers what it was asked.
/// A request as seen by [`MockPortal`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Answers every request with a canned response picked by URI path.
#[derive(Debug, Clone)]
pub struct MockPortal {
    status: StatusCode,
    body: String,
    routes: Vec<(String, StatusCode, String)>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockPortal {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            routes: Vec::new(),
            requests: Arc::default(),
        }
    }

    pub fn role_credentials(expiration_millis: i64) -> Self {
        Self::new(
            StatusCode::OK,
            format!(
                r#"{{"roleCredentials":{{"accessKeyId":"ASIAPORTAL","secretAccessKey":"portal-secret","sessionToken":"portal-session","expiration":{expiration_millis}}}}}"#
            ),
        )
    }

    /// Answer requests for `path` with `status` and `body` instead.
    pub fn route(mut self, path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.routes.push((path.to_string(), status, body.into()));
        self
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.recorded()
            .iter()
            .map(|req| {
                (
                    req.uri.to_string(),
                    req.headers
                        .get("x-amz-sso_bearer_token")
                        .map(|v| v.to_str().unwrap().to_string()),
                )
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpSend for MockPortal {
    async fn http_send(&self, req: http::Request<Bytes>) -> sigcurl_core::Result<Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let (status, resp_body) = self
            .routes
            .iter()
            .find(|(path, _, _)| parts.uri.path() == path)
            .map(|(_, status, body)| (*status, body.clone()))
            .unwrap_or_else(|| (self.status, self.body.clone()));

        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        Ok(Response::builder()
            .status(status)
            .body(Bytes::from(resp_body))?)
    }
}

pub fn test_context(home: &Path, portal: &MockPortal, envs: &[(&str, &str)]) -> Context {
    let _ = env_logger::builder().is_test(true).try_init();

    Context::new()
        .with_file_read(TokioFileRead)
        .with_file_write(TokioFileWrite)
        .with_http_send(portal.clone())
        .with_env(StaticEnv {
            home_dir: Some(home.to_path_buf()),
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
}

/// Write `content` to `home/<rel>`, creating parent directories.
pub fn write_file(home: &Path, rel: &str, content: &str) {
    let path = home.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Write an SSO token cache entry keyed by `key` (session name or start url).
pub fn write_token_cache(home: &Path, key: &str, access_token: &str, expires_at: &str) {
    let name = sigcurl_core::hash::hex_sha1(key.as_bytes());
    write_file(
        home,
        &format!(".aws/sso/cache/{name}.json"),
        &format!(
            r#"{{"startUrl":"https://example.awsapps.com/start","region":"us-east-1","accessToken":"{access_token}","expiresAt":"{expires_at}"}}"#
        ),
    );
}

/// Write a token cache as left behind by `aws sso login` for an `sso-session`,
/// including the client registration needed to refresh it.
pub fn write_refreshable_token_cache(
    home: &Path,
    key: &str,
    access_token: &str,
    expires_at: &str,
    registration_expires_at: &str,
) -> PathBuf {
    let name = sigcurl_core::hash::hex_sha1(key.as_bytes());
    let rel = format!(".aws/sso/cache/{name}.json");
    write_file(
        home,
        &rel,
        &format!(
            r#"{{"startUrl":"https://corp.awsapps.com/start","region":"eu-central-1","accessToken":"{access_token}","expiresAt":"{expires_at}","clientId":"client-id","clientSecret":"client-secret","registrationExpiresAt":"{registration_expires_at}","refreshToken":"refresh-1"}}"#
        ),
    );
    home.join(rel)
}
