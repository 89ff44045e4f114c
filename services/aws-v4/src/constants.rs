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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// Signing name used for API Gateway. Lambda Function URLs are signed with it too.
pub const EXECUTE_API_SERVICE: &str = "execute-api";
/// Signing name of AWS STS.
pub const STS_SERVICE: &str = "sts";

// Headers used in aws services.
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
pub const X_AMZ_SSO_BEARER_TOKEN: &str = "x-amz-sso_bearer_token";

/// Hex encoded SHA256 of an empty payload.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

// Env values used in aws services.
pub const AWS_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

// Keys used in the shared config and credentials files.
pub const AWS_ACCESS_KEY_ID_KEY: &str = "aws_access_key_id";
pub const AWS_SECRET_ACCESS_KEY_KEY: &str = "aws_secret_access_key";
pub const AWS_SESSION_TOKEN_KEY: &str = "aws_session_token";
pub const REGION_KEY: &str = "region";
pub const SSO_ACCOUNT_ID_KEY: &str = "sso_account_id";
pub const SSO_REGION_KEY: &str = "sso_region";
pub const SSO_ROLE_NAME_KEY: &str = "sso_role_name";
pub const SSO_START_URL_KEY: &str = "sso_start_url";
pub const SSO_SESSION_KEY: &str = "sso_session";
pub const ROLE_ARN_KEY: &str = "role_arn";
pub const SOURCE_PROFILE_KEY: &str = "source_profile";
pub const CREDENTIAL_SOURCE_KEY: &str = "credential_source";
pub const ROLE_SESSION_NAME_KEY: &str = "role_session_name";
pub const EXTERNAL_ID_KEY: &str = "external_id";
pub const DURATION_SECONDS_KEY: &str = "duration_seconds";
pub const MFA_SERIAL_KEY: &str = "mfa_serial";
pub const STS_REGIONAL_ENDPOINTS_KEY: &str = "sts_regional_endpoints";
pub const CREDENTIAL_PROCESS_KEY: &str = "credential_process";

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - `/` is kept since this set is used for paths.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// But used in query.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
