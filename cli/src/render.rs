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

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Response};
use log::debug;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io::{self, Write};

/// Write the status code and the body of `resp` to `out`.
pub fn render<W: Write>(out: &mut W, resp: &Response<bytes::Bytes>, raw: bool) -> io::Result<()> {
    writeln!(out, "Status Code: {}", resp.status().as_u16())?;
    writeln!(out, "Response Body:")?;
    writeln!(out, "{}", format_body(resp.headers(), resp.body(), raw))?;
    out.flush()
}

/// Pretty-print JSON bodies unless `raw` is set, print anything else as is.
pub fn format_body(headers: &HeaderMap, body: &[u8], raw: bool) -> String {
    if !raw && is_json(headers) {
        match pretty_json(body) {
            Some(v) => return v,
            None => debug!("body is not valid json, printing as is"),
        }
    }

    String::from_utf8_lossy(body).into_owned()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .map(|v| {
            String::from_utf8_lossy(v.as_bytes())
                .to_ascii_lowercase()
                .contains("application/json")
        })
        .unwrap_or(false)
}

fn pretty_json(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    let mut buf = Vec::with_capacity(body.len() * 2);
    let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"    "));
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).ok()?;

    String::from_utf8(buf).ok()
}

/// Pretty printer that escapes every non-ASCII character as `\uXXXX`.
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

macro_rules! delegate {
    ($($name:ident),+ $(,)?) => {
        $(
            fn $name<W>(&mut self, writer: &mut W) -> io::Result<()>
            where
                W: ?Sized + Write,
            {
                self.0.$name(writer)
            }
        )+
    };
}

macro_rules! delegate_first {
    ($($name:ident),+ $(,)?) => {
        $(
            fn $name<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
            where
                W: ?Sized + Write,
            {
                self.0.$name(writer, first)
            }
        )+
    };
}

impl Formatter for AsciiFormatter<'_> {
    delegate!(
        begin_array,
        end_array,
        end_array_value,
        begin_object,
        end_object,
        begin_object_value,
        end_object_value,
    );
    delegate_first!(begin_array_value, begin_object_key);

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..idx])?;
            // Astral characters become a surrogate pair.
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
