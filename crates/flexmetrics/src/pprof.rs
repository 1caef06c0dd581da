//! The profiling endpoint suite served under `/debug/pprof/`.
//!
//! | Path | Response |
//! |------|----------|
//! | `/debug/pprof/` | HTML index of the endpoints below |
//! | `/debug/pprof/cmdline` | process arguments separated by NUL bytes |
//! | `/debug/pprof/profile?seconds=N` | pprof protobuf CPU profile, 30 s by default |
//! | `/debug/pprof/symbol` | program counter to function name lookup |
//! | `/debug/pprof/trace?seconds=N` | folded stack samples, 1 s by default |
//!
//! CPU sampling runs at 100 Hz on a blocking thread and ends early when the
//! scope passed to `run` fires. Only one profile or trace can be collected at
//! a time; a concurrent request gets a 500.

use std::ffi::c_void;
use std::fmt::Write as _;
use std::time::Duration;

use bytes::Bytes;
use http::{header, HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;
use pprof::protos::Message;
use pprof::{ProfilerGuardBuilder, Report};
use serde::Deserialize;

use crate::error::ProfileError;
use crate::scope::Scope;
use crate::server::HttpResponse;

/// Sampling frequency of the CPU profiler, in Hz.
pub const SAMPLE_FREQUENCY: i32 = 100;

/// Default `profile` duration.
pub const DEFAULT_PROFILE_SECONDS: u64 = 30;

/// Default `trace` duration.
pub const DEFAULT_TRACE_SECONDS: f64 = 1.0;

/// Libraries whose frames are not sampled.
const BLOCKLIST: [&str; 4] = ["libc", "libgcc", "pthread", "vdso"];

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// `(name, description)` of each endpoint listed on the index page.
const ENDPOINTS: [(&str, &str); 4] = [
    (
        "cmdline",
        "The command line invocation of the current program",
    ),
    (
        "profile",
        "CPU profile. You can specify the duration in the seconds GET parameter. \
         After you get the profile file, use a pprof-compatible viewer to inspect it.",
    ),
    (
        "symbol",
        "Maps program counters to function names. Addresses are passed as \
         '+'-separated values in the query string or the POST body.",
    ),
    (
        "trace",
        "A trace of execution of the current program as folded stack samples. \
         You can specify the duration in the seconds GET parameter.",
    ),
];

#[derive(Debug, Default, Deserialize)]
struct SecondsQuery {
    seconds: Option<String>,
}

impl SecondsQuery {
    fn parse(query: Option<&str>) -> Self {
        query
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default()
    }

    /// Whole seconds; missing, invalid or non-positive values yield `default`.
    fn whole_seconds(&self, default: u64) -> Duration {
        let secs = self
            .seconds
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .and_then(|s| u64::try_from(s).ok())
            .filter(|s| *s > 0)
            .unwrap_or(default);
        Duration::from_secs(secs)
    }

    /// Fractional seconds; missing, invalid or non-positive values yield `default`.
    fn fractional_seconds(&self, default: f64) -> Duration {
        self.seconds
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .unwrap_or_else(|| Duration::from_secs_f64(default))
    }
}

/// Serves the index page.
pub(crate) fn index() -> HttpResponse {
    let mut html = String::from(
        "<html>\n<head>\n<title>/debug/pprof/</title>\n</head>\n<body>\n/debug/pprof/\n<br>\n\
         Types of profiles available:\n<table>\n<thead><td>Profile</td></thead>\n",
    );
    for (name, _) in ENDPOINTS {
        let _ = writeln!(html, "<tr><td><a href=\"{name}\">{name}</a></td></tr>");
    }
    html.push_str("</table>\n<p>\nProfile Descriptions:\n<ul>\n");
    for (name, description) in ENDPOINTS {
        let _ = writeln!(
            html,
            "<li><div class=profile-name>{name}: </div> {description}</li>"
        );
    }
    html.push_str("</ul>\n</p>\n</body>\n</html>\n");

    respond(StatusCode::OK, "text/html; charset=utf-8", html)
}

/// Serves the process arguments, NUL separated.
pub(crate) fn cmdline() -> HttpResponse {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    respond(StatusCode::OK, TEXT_PLAIN, args.join("\0"))
}

/// Samples the CPU and returns a pprof protobuf profile.
pub(crate) async fn profile(
    query: Option<&str>,
    write_timeout: Option<Duration>,
    scope: &Scope,
) -> HttpResponse {
    let duration = SecondsQuery::parse(query).whole_seconds(DEFAULT_PROFILE_SECONDS);
    if exceeds_write_timeout(duration, write_timeout) {
        return serve_error(
            StatusCode::BAD_REQUEST,
            "profile duration exceeds server's WriteTimeout",
        );
    }

    match sample(duration, scope.clone(), encode_profile).await {
        Ok(body) => attachment("profile", body),
        Err(e) => {
            tracing::warn!(error = %e, "cpu profile failed");
            serve_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Samples the CPU and returns the folded stacks observed.
pub(crate) async fn trace(
    query: Option<&str>,
    write_timeout: Option<Duration>,
    scope: &Scope,
) -> HttpResponse {
    let duration = SecondsQuery::parse(query).fractional_seconds(DEFAULT_TRACE_SECONDS);
    if exceeds_write_timeout(duration, write_timeout) {
        return serve_error(
            StatusCode::BAD_REQUEST,
            "profile duration exceeds server's WriteTimeout",
        );
    }

    match sample(duration, scope.clone(), fold_stacks).await {
        Ok(body) => attachment("trace", body),
        Err(e) => {
            tracing::warn!(error = %e, "execution trace failed");
            serve_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Resolves program counters to function names.
///
/// Addresses come from the raw query string for GET and HEAD, and from the
/// body for POST.
pub(crate) fn symbol(method: &Method, query: Option<&str>, body: &Bytes) -> HttpResponse {
    let input = if method == Method::POST {
        String::from_utf8_lossy(body).into_owned()
    } else {
        query.unwrap_or_default().to_string()
    };

    let mut out = String::from("num_symbols: 1\n");
    for pc in input.split('+').filter_map(parse_address) {
        if let Some(name) = resolve_symbol(pc) {
            let _ = writeln!(out, "{pc:#x} {name}");
        }
    }

    respond(StatusCode::OK, TEXT_PLAIN, out)
}

/// Parses a program counter written in hex (`0x` prefix) or decimal.
fn parse_address(word: &str) -> Option<usize> {
    let word = word.trim();
    let pc = match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok()?,
        None => word.parse().ok()?,
    };
    (pc != 0).then_some(pc)
}

fn resolve_symbol(pc: usize) -> Option<String> {
    let mut name = None;
    backtrace::resolve(pc as *mut c_void, |symbol| {
        if name.is_none() {
            name = symbol.name().map(|n| n.to_string());
        }
    });
    name
}

fn exceeds_write_timeout(duration: Duration, write_timeout: Option<Duration>) -> bool {
    write_timeout.is_some_and(|limit| duration >= limit)
}

/// Runs the sampling profiler for `duration` (or until `scope` fires) and
/// hands the report to `finish`.
///
/// The profiler guard and report never cross an await point; both live on a
/// blocking thread.
async fn sample(
    duration: Duration,
    scope: Scope,
    finish: fn(&Report) -> Result<Vec<u8>, ProfileError>,
) -> Result<Vec<u8>, ProfileError> {
    let runtime = tokio::runtime::Handle::current();

    tokio::task::spawn_blocking(move || {
        let guard = ProfilerGuardBuilder::default()
            .frequency(SAMPLE_FREQUENCY)
            .blocklist(&BLOCKLIST)
            .build()
            .map_err(|e| ProfileError::Start(e.to_string()))?;

        runtime.block_on(async {
            tokio::select! {
                () = tokio::time::sleep(duration) => {}
                () = scope.cancelled() => {}
            }
        });

        let report = guard
            .report()
            .build()
            .map_err(|e| ProfileError::Report(e.to_string()))?;
        finish(&report)
    })
    .await
    .map_err(|e| ProfileError::Report(e.to_string()))?
}

fn encode_profile(report: &Report) -> Result<Vec<u8>, ProfileError> {
    let profile = report
        .pprof()
        .map_err(|e| ProfileError::Report(e.to_string()))?;

    let mut buf = Vec::new();
    profile
        .encode(&mut buf)
        .map_err(|e| ProfileError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Renders the report as `thread;outer;...;inner count` lines, sorted.
fn fold_stacks(report: &Report) -> Result<Vec<u8>, ProfileError> {
    let mut lines: Vec<String> = report
        .data
        .iter()
        .map(|(frames, count)| {
            let thread = if frames.thread_name.is_empty() {
                frames.thread_id.to_string()
            } else {
                frames.thread_name.clone()
            };

            let mut stack = vec![thread];
            // Frames are stored innermost first.
            for frame in frames.frames.iter().rev() {
                stack.extend(frame.iter().rev().map(pprof::Symbol::name));
            }
            format!("{} {count}", stack.join(";"))
        })
        .collect();
    lines.sort();

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out.into_bytes())
}

fn attachment(filename: &str, body: Vec<u8>) -> HttpResponse {
    let mut response = respond(StatusCode::OK, OCTET_STREAM, body);
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

fn serve_error(status: StatusCode, message: &str) -> HttpResponse {
    respond(status, TEXT_PLAIN, format!("{message}\n"))
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_seconds_query_defaults() {
        let q = SecondsQuery::parse(None);
        assert_eq!(q.whole_seconds(30), Duration::from_secs(30));
        assert_eq!(q.fractional_seconds(1.0), Duration::from_secs(1));

        for bad in ["seconds=abc", "seconds=0", "seconds=-3", "seconds=", "other=5"] {
            let q = SecondsQuery::parse(Some(bad));
            assert_eq!(q.whole_seconds(30), Duration::from_secs(30), "{bad}");
            assert_eq!(q.fractional_seconds(1.0), Duration::from_secs(1), "{bad}");
        }
    }

    #[test]
    fn test_seconds_query_values() {
        let q = SecondsQuery::parse(Some("seconds=5"));
        assert_eq!(q.whole_seconds(30), Duration::from_secs(5));

        let q = SecondsQuery::parse(Some("debug=1&seconds=0.25"));
        assert_eq!(q.fractional_seconds(1.0), Duration::from_millis(250));
        // Not a whole number, so the profile default applies.
        assert_eq!(q.whole_seconds(30), Duration::from_secs(30));
    }

    #[test]
    fn test_exceeds_write_timeout() {
        let limit = Some(Duration::from_secs(15));
        assert!(exceeds_write_timeout(Duration::from_secs(30), limit));
        assert!(exceeds_write_timeout(Duration::from_secs(15), limit));
        assert!(!exceeds_write_timeout(Duration::from_secs(14), limit));
        assert!(!exceeds_write_timeout(Duration::from_secs(3600), None));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1f"), Some(0x1f));
        assert_eq!(parse_address("0X1F"), Some(0x1f));
        assert_eq!(parse_address("31"), Some(31));
        assert_eq!(parse_address("0x0"), None);
        assert_eq!(parse_address(""), None);
        assert_eq!(parse_address("zz"), None);
    }

    #[tokio::test]
    async fn test_profile_rejected_when_longer_than_write_timeout() {
        let response = profile(None, Some(Duration::from_secs(15)), &Scope::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(
            body_text(response).await,
            "profile duration exceeds server's WriteTimeout\n"
        );
    }

    #[tokio::test]
    async fn test_trace_rejected_when_longer_than_write_timeout() {
        let response = trace(Some("seconds=2"), Some(Duration::from_secs(1)), &Scope::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_symbol_without_addresses() {
        let response = symbol(&Method::GET, None, &Bytes::new());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "num_symbols: 1\n");
    }

    #[tokio::test]
    async fn test_symbol_get_and_post_agree() {
        fn marker() {}
        let pc = marker as usize;
        let query = format!("{pc:#x}");

        let text = body_text(symbol(&Method::GET, Some(&query), &Bytes::new())).await;
        assert!(text.starts_with("num_symbols: 1\n"));

        let post = body_text(symbol(&Method::POST, None, &Bytes::from(query))).await;
        assert_eq!(text, post);
    }

    #[tokio::test]
    async fn test_cmdline_is_nul_separated() {
        let expected: Vec<String> = std::env::args().collect();
        let response = cmdline();
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(body_text(response).await, expected.join("\0"));
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let response = index();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        for (name, _) in ENDPOINTS {
            assert!(html.contains(&format!("href=\"{name}\"")), "{name}");
        }
    }
}
