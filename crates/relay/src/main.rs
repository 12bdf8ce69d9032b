// Copyright (c) 2025 Zensical and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Relay demo driver.

use anyhow::Context;
use clap::{ArgAction, Parser as _};
use relay_emit::LifecycleKind;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use relay_serve::dispatch::{Dispatcher, Responder};
use relay_serve::handler::Next;
use relay_serve::http::Request;
use relay_serve::parser::{Assembler, Kind, Message, MessageKind, Parser};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Requests dispatched when no files are given.
const SAMPLE: &[u8] = b"GET /handler1 HTTP/1.1\r\n\
    Host: localhost\r\n\
    \r\n\
    GET /handler2 HTTP/1.1\r\n\
    Host: localhost\r\n\
    \r\n\
    POST /doesnotexist HTTP/1.1\r\n\
    Host: localhost\r\n\
    Transfer-Encoding: chunked\r\n\
    \r\n\
    5\r\nhello\r\n\
    0\r\n\
    \r\n";

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Parse raw HTTP requests and dispatch them through a demo chain.
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files with raw HTTP requests, each parsed as a separate stream
    files: Vec<PathBuf>,

    /// Log diagnostics to standard error, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Setup tracing if requested.
fn setup_tracing(verbose: u8) {
    let level = match verbose {
        0 => return,
        1 => "debug",
        _ => "trace",
    };

    // Allow the environment to override the level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses all requests contained in the given bytes.
fn parse(bytes: &[u8]) -> anyhow::Result<Vec<Request>> {
    let mut parser = Parser::new(Kind::Request);
    parser.emitter().on(
        MessageKind::Listener(LifecycleKind::NewListener),
        |message: &Message| tracing::trace!(?message, "subscription"),
    );

    // Assemble requests while parsing
    let assembler = Assembler::attach(parser.emitter());
    let count = parser.receive(bytes)?;
    parser.finish()?;
    tracing::debug!(count, "parsed requests");
    Ok(assembler.drain())
}

/// Creates the demo dispatcher.
fn demo() -> Dispatcher {
    Dispatcher::builder()
        .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
            if req.target == "/handler1" {
                res.end("I only listen on /handler1!")
            } else {
                next.run(req, res)
            }
        })
        .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
            if req.target == "/handler2" {
                res.end("I only listen on /handler2!")
            } else {
                next.run(req, res)
            }
        })
        .build()
}

/// Runs the demo.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    // Parse requests from all given files, or from the sample
    let mut requests = Vec::new();
    if cli.files.is_empty() {
        requests.extend(parse(SAMPLE).context("failed to parse sample")?);
    }
    for path in &cli.files {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed = parse(&bytes)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        requests.extend(parsed);
    }

    // Dispatch through a chain answering every request
    let mut dispatcher = Dispatcher::new();
    dispatcher.add(|_: &Request, res: &mut Responder, _: Next<'_>| {
        res.end("It works!")
    });
    dispatcher.dispatch(&Request::new())?;

    // Dispatch through the demo chain
    let dispatcher = demo();
    for req in &requests {
        dispatcher
            .dispatch(req)
            .with_context(|| format!("failed to dispatch {}", req.target))?;
    }

    // Dispatch through an empty chain, which always falls back
    Dispatcher::new().dispatch(&Request::new())?;
    Ok(())
}
