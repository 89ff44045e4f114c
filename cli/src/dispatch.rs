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

use crate::{Error, ResolvedProfile};
use bytes::Bytes;
use http::{Request, Response, Uri};
use log::debug;
use sigcurl_aws_v4::{RequestSigner, EXECUTE_API_SERVICE};
use sigcurl_core::{Context, SignRequest};

/// Build a GET request for `location` signed for `execute-api`.
pub async fn sign(
    ctx: &Context,
    resolved: &ResolvedProfile,
    location: &Uri,
) -> Result<Request<Bytes>, Error> {
    let (mut parts, body) = Request::get(location.clone())
        .body(Bytes::new())
        .map_err(|err| Error::Signing(err.into()))?
        .into_parts();

    RequestSigner::new(EXECUTE_API_SERVICE, &resolved.region)
        .sign_request(ctx, &mut parts, Some(&resolved.credential))
        .await
        .map_err(Error::Signing)?;

    Ok(Request::from_parts(parts, body))
}

/// Send the signed request once.
pub async fn send(ctx: &Context, req: Request<Bytes>) -> Result<Response<Bytes>, Error> {
    let location = req.uri().to_string();
    debug!("sending signed request: {req:?}");

    let resp = ctx
        .http_send(req)
        .await
        .map_err(|source| Error::Transport { location, source })?;

    debug!("got response with status {}", resp.status());
    Ok(resp)
}
