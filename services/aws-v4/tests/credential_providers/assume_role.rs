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

use super::{test_context, write_file, write_token_cache, MockPortal, RecordedRequest};
use chrono::{TimeDelta, Utc};
use http::StatusCode;
use pretty_assertions::assert_eq;
use sigcurl_aws_v4::{AssumeRoleCredentialProvider, DefaultCredentialProvider};
use sigcurl_core::{ErrorKind, ProvideCredential};

const CONFIG: &str = r#"
[profile deploy]
role_arn = arn:aws:iam::123456789012:role/Deploy
source_profile = base
role_session_name = ci
region = eu-west-1

[profile global]
role_arn = arn:aws:iam::123456789012:role/Deploy
source_profile = base
region = eu-west-1
sts_regional_endpoints = legacy

[profile via-sso]
role_arn = arn:aws:iam::123456789012:role/Deploy
source_profile = dev
region = us-east-2

[profile dev]
sso_start_url = https://dev.awsapps.com/start
sso_region = us-east-1
sso_account_id = 111122223333
sso_role_name = Developer

[profile self]
role_arn = arn:aws:iam::123456789012:role/Deploy
source_profile = self
region = eu-west-1

[profile ping]
role_arn = arn:aws:iam::123456789012:role/Ping
source_profile = pong

[profile pong]
role_arn = arn:aws:iam::123456789012:role/Pong
source_profile = ping

[profile ghost]
role_arn = arn:aws:iam::123456789012:role/Deploy
source_profile = missing
"#;

const CREDENTIALS: &str = r#"
[base]
aws_access_key_id = AKIDBASE
aws_secret_access_key = base-secret

[self]
aws_access_key_id = AKIDSELF
aws_secret_access_key = self-secret
"#;

fn sts_response() -> String {
    let expiration = (Utc::now() + TimeDelta::try_hours(1).unwrap()).to_rfc3339();
    format!(
        r#"<AssumeRoleResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleResult>
    <Credentials>
      <AccessKeyId>ASIAROLE</AccessKeyId>
      <SecretAccessKey>role-secret</SecretAccessKey>
      <SessionToken>role-session</SessionToken>
      <Expiration>{expiration}</Expiration>
    </Credentials>
  </AssumeRoleResult>
</AssumeRoleResponse>"#
    )
}

fn sts() -> MockPortal {
    MockPortal::new(StatusCode::NOT_FOUND, "").route("/", StatusCode::OK, sts_response())
}

fn home() -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    write_file(home.path(), ".aws/config", CONFIG);
    write_file(home.path(), ".aws/credentials", CREDENTIALS);
    home
}

fn sts_request(mock: &MockPortal) -> RecordedRequest {
    mock.recorded()
        .into_iter()
        .find(|req| req.uri.path() == "/")
        .expect("STS must be called")
}

fn authorization(req: &RecordedRequest) -> String {
    req.headers["authorization"].to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_assume_role_with_static_source() {
    let home = home();
    let mock = sts();
    let ctx = test_context(home.path(), &mock, &[]);

    let cred = DefaultCredentialProvider::with_profile("deploy")
        .provide_credential(&ctx)
        .await
        .unwrap()
        .expect("role credential must load");
    assert_eq!(cred.access_key_id, "ASIAROLE");
    assert_eq!(cred.secret_access_key, "role-secret");
    assert_eq!(cred.session_token.as_deref(), Some("role-session"));
    assert!(cred.expires_in.is_some());

    let req = sts_request(&mock);
    assert_eq!(req.method, http::Method::GET);
    assert_eq!(req.uri.host(), Some("sts.eu-west-1.amazonaws.com"));
    let query = req.uri.query().unwrap();
    assert!(query.contains("Action=AssumeRole"), "{query}");
    assert!(
        query.contains("RoleArn=arn%3Aaws%3Aiam%3A%3A123456789012%3Arole%2FDeploy"),
        "{query}"
    );
    assert!(query.contains("RoleSessionName=ci"), "{query}");

    let auth = authorization(&req);
    assert!(auth.contains("Credential=AKIDBASE/"), "{auth}");
    assert!(auth.contains("/eu-west-1/sts/aws4_request"), "{auth}");
}

#[tokio::test]
async fn test_assume_role_with_global_endpoint() {
    let home = home();
    let mock = sts();
    let ctx = test_context(home.path(), &mock, &[]);

    DefaultCredentialProvider::with_profile("global")
        .provide_credential(&ctx)
        .await
        .unwrap()
        .expect("role credential must load");

    let req = sts_request(&mock);
    assert_eq!(req.uri.host(), Some("sts.amazonaws.com"));
    assert!(authorization(&req).contains("/us-east-1/sts/aws4_request"));
}

#[tokio::test]
async fn test_assume_role_with_sso_source() {
    let home = home();
    write_token_cache(
        home.path(),
        "https://dev.awsapps.com/start",
        "dev-token",
        &(Utc::now() + TimeDelta::try_hours(8).unwrap()).to_rfc3339(),
    );
    let expiration = (Utc::now() + TimeDelta::try_hours(1).unwrap()).timestamp_millis();
    let mock = MockPortal::role_credentials(expiration).route("/", StatusCode::OK, sts_response());
    let ctx = test_context(home.path(), &mock, &[]);

    let cred = DefaultCredentialProvider::with_profile("via-sso")
        .provide_credential(&ctx)
        .await
        .unwrap()
        .expect("role credential must load");
    assert_eq!(cred.access_key_id, "ASIAROLE");

    let req = sts_request(&mock);
    assert!(authorization(&req).contains("Credential=ASIAPORTAL/"));
    assert_eq!(req.headers["x-amz-security-token"], "portal-session");
}

#[tokio::test]
async fn test_assume_role_with_own_static_keys() {
    let home = home();
    let mock = sts();
    let ctx = test_context(home.path(), &mock, &[]);

    let cred = DefaultCredentialProvider::with_profile("self")
        .provide_credential(&ctx)
        .await
        .unwrap()
        .expect("role credential must load");
    assert_eq!(cred.access_key_id, "ASIAROLE");
    assert!(authorization(&sts_request(&mock)).contains("Credential=AKIDSELF/"));
}

#[tokio::test]
async fn test_assume_role_denied() {
    let home = home();
    let mock = MockPortal::new(StatusCode::NOT_FOUND, "").route(
        "/",
        StatusCode::FORBIDDEN,
        "<ErrorResponse><Error><Code>AccessDenied</Code></Error></ErrorResponse>",
    );
    let ctx = test_context(home.path(), &mock, &[]);

    let err = DefaultCredentialProvider::with_profile("deploy")
        .provide_credential(&ctx)
        .await
        .expect_err("denied role must be reported");
    assert_eq!(err.kind(), ErrorKind::CredentialDenied);
    assert!(err.to_string().contains("AccessDenied"), "{err}");
}

#[tokio::test]
async fn test_source_profile_cycle() {
    let home = home();
    let mock = sts();
    let ctx = test_context(home.path(), &mock, &[]);

    let err = AssumeRoleCredentialProvider::new()
        .with_profile("ping")
        .provide_credential(&ctx)
        .await
        .expect_err("cycle must be rejected");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(mock.recorded().is_empty());

    let cred = DefaultCredentialProvider::with_profile("ping")
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert!(cred.is_none());
}

#[tokio::test]
async fn test_missing_source_profile() {
    let home = home();
    let mock = sts();
    let ctx = test_context(home.path(), &mock, &[]);

    let err = AssumeRoleCredentialProvider::new()
        .with_profile("ghost")
        .provide_credential(&ctx)
        .await
        .expect_err("missing source must be rejected");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(err.to_string().contains("missing"), "{err}");
    assert!(mock.recorded().is_empty());
}
