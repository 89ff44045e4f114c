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

//! Send a single SigV4 signed GET request and print the response.
//!
//! A run goes through fixed stages, each one terminal on failure except the
//! last: resolve the profile, sign, dispatch, render.
//!
//! ```no_run
//! use clap::Parser;
//! use sigcurl::{run, Cli, ProfileResolver};
//! use sigcurl_core::{Context, OsEnv};
//! use sigcurl_file_read_tokio::TokioFileRead;
//! use sigcurl_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> Result<(), sigcurl::Error> {
//! let cli = Cli::parse_from([
//!     "sigcurl",
//!     "--profile",
//!     "dev",
//!     "--location",
//!     "https://abc123.execute-api.us-east-1.amazonaws.com/prod/items",
//! ]);
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! run(&ctx, &ProfileResolver, &cli, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

mod args;
pub use args::Cli;

mod error;
pub use error::Error;

mod resolve;
pub use resolve::{ProfileResolver, ResolveProfile, ResolvedProfile};

pub mod dispatch;
pub mod render;

use log::info;
use sigcurl_core::Context;
use std::io::Write;

/// Resolve, sign, send and render one request described by `cli`.
///
/// Nothing is sent unless both credentials and region were resolved.
pub async fn run<W: Write>(
    ctx: &Context,
    resolver: &dyn ResolveProfile,
    cli: &Cli,
    out: &mut W,
) -> Result<(), Error> {
    let resolved = resolver.resolve(ctx, &cli.profile).await?;
    info!(
        "signing GET {} for profile {} in {}",
        cli.location, cli.profile, resolved.region
    );

    let req = dispatch::sign(ctx, &resolved, &cli.location).await?;
    let resp = dispatch::send(ctx, req).await?;

    render::render(out, &resp, cli.raw)?;
    Ok(())
}
