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

//! Compare our signatures with the ones computed by `aws-sigv4`.

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use http::{header, Request};
use pretty_assertions::assert_eq;
use sigcurl_aws_v4::{Credential, RequestSigner, EXECUTE_API_SERVICE};
use sigcurl_core::time::now;
use sigcurl_core::{Context, SignRequest};
use std::time::SystemTime;

const URIS: &[&str] = &[
    "https://abc123.execute-api.us-east-1.amazonaws.com/",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/items",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/items/",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/items?limit=10&after=abc",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/items?b=2&a=1&a=0",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/hello%20world",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/a:b/c=d",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/./stage/../items",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod/search?q=a%2Fb%20c",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod?fZ=1&f%5B0%5D=2",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod?t1=x&t%3A=y",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod?az=1&a%7B=2&a.b=3&a%2Fb=4",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod?%C3%A9t%C3%A9=1&ete=2",
    "https://abc123.execute-api.us-east-1.amazonaws.com/prod?q=a+b&flag",
    "https://abc123.lambda-url.us-east-1.on.aws/",
];

async fn compare(uri: &str, session_token: Option<&str>) {
    let now = now();

    let id = Credentials::new(
        "AKIDEXAMPLE",
        "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        session_token.map(|v| v.to_string()),
        None,
        "hardcoded-credentials",
    )
    .into();
    let sp = v4::SigningParams::builder()
        .identity(&id)
        .region("us-east-1")
        .name(EXECUTE_API_SERVICE)
        .time(SystemTime::from(now))
        .settings(SigningSettings::default())
        .build()
        .expect("signing params must be valid");

    let mut expected = Request::get(uri).body(()).unwrap();
    let output = aws_sigv4::http_request::sign(
        SignableRequest::new(
            expected.method().as_str(),
            expected.uri().to_string(),
            std::iter::empty(),
            SignableBody::Bytes(b""),
        )
        .unwrap(),
        &sp.into(),
    )
    .expect("aws-sigv4 must sign");
    let (instructions, _) = output.into_parts();
    instructions.apply_to_request_http1x(&mut expected);

    let cred = Credential {
        access_key_id: "AKIDEXAMPLE".to_string(),
        secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
        session_token: session_token.map(|v| v.to_string()),
        expires_in: None,
    };
    let (mut parts, _) = Request::get(uri).body(()).unwrap().into_parts();
    RequestSigner::new(EXECUTE_API_SERVICE, "us-east-1")
        .with_time(now)
        .sign_request(&Context::new(), &mut parts, Some(&cred))
        .await
        .expect("sign request must succeed");

    assert_eq!(
        expected.headers()[header::AUTHORIZATION],
        parts.headers[header::AUTHORIZATION],
        "authorization mismatch for {uri}"
    );
    assert_eq!(
        expected.headers()["x-amz-date"],
        parts.headers["x-amz-date"],
        "date mismatch for {uri}"
    );
    assert_eq!(
        expected.headers().get("x-amz-security-token"),
        parts.headers.get("x-amz-security-token"),
        "token mismatch for {uri}"
    );
}

#[tokio::test]
async fn test_matches_aws_sigv4() {
    let _ = env_logger::builder().is_test(true).try_init();

    for uri in URIS {
        compare(uri, None).await;
    }
}

#[tokio::test]
async fn test_matches_aws_sigv4_with_session_token() {
    let _ = env_logger::builder().is_test(true).try_init();

    for uri in URIS {
        compare(uri, Some("FwoGZXIvYXdzEBYaDHm2session")).await;
    }
}
