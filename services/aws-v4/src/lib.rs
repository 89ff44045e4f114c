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

//! AWS SigV4 signing and profile based credential resolution.
//!
//! - [`RequestSigner`] signs an `http::request::Parts` in place.
//! - [`DefaultCredentialProvider`] resolves credentials for a named profile
//!   from static keys or a cached SSO session.
//! - [`RegionLoader`] resolves the region configured for a profile.

mod constants;
pub use constants::EXECUTE_API_SERVICE;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod region;
pub use region::RegionLoader;

mod sign_request;
pub use sign_request::RequestSigner;
