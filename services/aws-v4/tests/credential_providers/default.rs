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

use super::{test_context, write_file, write_token_cache, MockPortal};
use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use sigcurl_aws_v4::{DefaultCredentialProvider, RegionLoader};
use sigcurl_core::{ErrorKind, ProvideCredential, SigningCredential};

const CONFIG: &str = r#"
[default]
region = us-west-2

[profile dev]
sso_start_url = https://dev.awsapps.com/start
sso_region = us-east-1
sso_account_id = 111122223333
sso_role_name = Developer
region = ap-southeast-2

[profile ci]
region = eu-west-1
"#;

const CREDENTIALS: &str = r#"
[ci]
aws_access_key_id = AKIACI
aws_secret_access_key = ci-secret
"#;

#[tokio::test]
async fn test_profile_resolution_end_to_end() {
    let home = tempfile::tempdir().unwrap();
    write_file(home.path(), ".aws/config", CONFIG);
    write_file(home.path(), ".aws/credentials", CREDENTIALS);
    write_token_cache(
        home.path(),
        "https://dev.awsapps.com/start",
        "dev-token",
        &(Utc::now() + TimeDelta::try_hours(8).unwrap()).to_rfc3339(),
    );

    let portal = MockPortal::role_credentials(
        (Utc::now() + TimeDelta::try_hours(1).unwrap()).timestamp_millis(),
    );
    let ctx = test_context(home.path(), &portal, &[]);

    let ci = DefaultCredentialProvider::with_profile("ci")
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ci.access_key_id, "AKIACI");
    assert!(ci.is_valid());
    assert!(portal.requests().is_empty());

    let dev = DefaultCredentialProvider::with_profile("dev")
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dev.access_key_id, "ASIAPORTAL");
    assert!(dev.is_valid());
    assert_eq!(portal.requests().len(), 1);

    assert_eq!(
        RegionLoader::new().with_profile("ci").load(&ctx).await.unwrap(),
        Some("eu-west-1".to_string())
    );
    assert_eq!(
        RegionLoader::new().with_profile("dev").load(&ctx).await.unwrap(),
        Some("ap-southeast-2".to_string())
    );
}

#[tokio::test]
async fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    write_file(home.path(), ".aws/config", CONFIG);
    write_file(home.path(), ".aws/credentials", CREDENTIALS);

    let portal = MockPortal::role_credentials(0);
    let ctx = test_context(home.path(), &portal, &[]);

    let cred = DefaultCredentialProvider::with_profile("nope")
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert!(cred.is_none());
    assert!(portal.requests().is_empty());
}

#[tokio::test]
async fn test_sso_profile_without_login() {
    let home = tempfile::tempdir().unwrap();
    write_file(home.path(), ".aws/config", CONFIG);

    let portal = MockPortal::role_credentials(0);
    let ctx = test_context(home.path(), &portal, &[]);

    let err = DefaultCredentialProvider::with_profile("dev")
        .provide_credential(&ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialExpired);
}
