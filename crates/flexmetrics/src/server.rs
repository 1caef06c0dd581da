//! The metrics server: configuration resolution and lifecycle.
//!
//! # Architecture
//!
//! - [`Server::new`] resolves defaults, environment and options into a
//!   ready-to-run value. It never fails; bad addresses surface in `run`.
//! - [`Server::run`] binds the listener, installs the route table and accepts
//!   connections until [`Server::halt`] closes the listener.
//! - Each connection is served on its own task (hyper HTTP/1.1) and holds a
//!   tracker token, so `halt` can wait for in-flight requests.
//!
//! ```text
//!   created ──run──▶ serving ──halt──▶ shutting_down ──▶ stopped
//!                     │                                    ▲
//!                     └──bind/accept fatal error───────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use flexmetrics::options::with_addr;
//! use flexmetrics::{Scope, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), flexmetrics::ServerError> {
//!     let server = Arc::new(Server::new(vec![with_addr("127.0.0.1:0")]));
//!
//!     let runner = Arc::clone(&server);
//!     let serving = tokio::spawn(async move { runner.run(&Scope::new()).await });
//!
//!     let addr = server.ready().await;
//!     println!("listening on {addr:?}");
//!
//!     server.halt(&Scope::with_timeout(Duration::from_secs(5))).await?;
//!     serving.await.expect("run task panicked")
//! }
//! ```

use std::convert::Infallible;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{header, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::{normalize_path, EnvSnapshot};
use crate::context::RequestContext;
use crate::error::ServerError;
use crate::http::HttpServer;
use crate::logger::{default_logger, Logger};
use crate::options::Opt;
use crate::router::{Endpoint, RouteOutcome, Router};
use crate::scope::Scope;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::telemetry::{self, InFlightGuard};
use crate::{pprof, prometheus};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// First delay after a transient accept error.
const MIN_ACCEPT_BACKOFF: Duration = Duration::from_millis(5);

/// Upper bound of the accept retry delay.
const MAX_ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// How long an expired `halt` still waits for `run` to drop the listener.
const LISTENER_CLOSE_GRACE: Duration = Duration::from_millis(50);

/// Unix `ENFILE`: the system-wide open file table is full.
const ENFILE: i32 = 23;

/// Unix `EMFILE`: the process has reached its descriptor limit.
const EMFILE: i32 = 24;

/// Lifecycle state of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Resolved but not yet bound.
    Created,
    /// Accepting connections.
    Serving,
    /// `halt` is draining connections.
    ShuttingDown,
    /// Terminal.
    Stopped,
}

/// Successful outcome of [`Server::halt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltOutcome {
    /// Every in-flight request completed.
    Graceful,
    /// The server had already been shut down.
    AlreadyStopped,
}

/// An embeddable Prometheus metrics and profiling server.
///
/// Shared between the task awaiting [`run`](Self::run) and the caller of
/// [`halt`](Self::halt), typically through an [`Arc`].
pub struct Server {
    /// Path of the Prometheus exposition
    path: String,

    /// Embedded HTTP server settings
    http: HttpServer,

    /// Receives the startup and shutdown lines
    logger: Arc<dyn Logger>,

    /// Explicit exposition source, if any
    prometheus: Option<PrometheusHandle>,

    started: AtomicBool,
    state: watch::Sender<State>,
    listener_addr: Mutex<Option<SocketAddr>>,

    /// Stops the accept loop and drains connections
    shutdown: ShutdownSignal,

    /// Drops connections that are still open
    force: ShutdownSignal,

    /// Fired by `run` once the listener is gone
    listener_closed: ShutdownSignal,

    /// Open connections
    tracker: ConnectionTracker,

    /// Requests being handled, across all connections
    requests: ConnectionTracker,
}

impl Server {
    /// Resolves a server from the process environment and `options`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use flexmetrics::options::{with_addr, with_path};
    /// use flexmetrics::Server;
    ///
    /// let server = Server::new(vec![with_addr("127.0.0.1:0"), with_path("/prom")]);
    /// assert_eq!(server.addr(), "127.0.0.1:0");
    /// assert_eq!(server.path(), "/prom");
    /// ```
    pub fn new(options: impl IntoIterator<Item = Opt>) -> Self {
        Self::from_env(&EnvSnapshot::from_process(), options)
    }

    /// Resolves a server from an explicit environment snapshot and `options`.
    pub fn from_env(env: &EnvSnapshot, options: impl IntoIterator<Item = Opt>) -> Self {
        let mut path = env.path().to_string();
        let mut http = HttpServer::with_default_timeouts(env.addr());
        let mut logger = None;
        let mut prometheus = None;

        for option in options {
            match option {
                Opt::Path(p) => path = p,
                Opt::Addr(addr) => http.set_addr(addr),
                Opt::Server(server) => http = server,
                Opt::Logger(l) => logger = Some(l),
                Opt::PrometheusHandle(handle) => prometheus = Some(handle),
                Opt::ReadTimeout(t) => http.set_read_timeout(t),
                Opt::ReadHeaderTimeout(t) => http.set_read_header_timeout(t),
                Opt::IdleTimeout(t) => http.set_idle_timeout(t),
                Opt::WriteTimeout(t) => http.set_write_timeout(t),
            }
        }

        let (state, _) = watch::channel(State::Created);

        Self {
            path: normalize_path(&path),
            http,
            logger: logger.unwrap_or_else(default_logger),
            prometheus,
            started: AtomicBool::new(false),
            state,
            listener_addr: Mutex::new(None),
            shutdown: ShutdownSignal::new(),
            force: ShutdownSignal::new(),
            listener_closed: ShutdownSignal::new(),
            tracker: ConnectionTracker::new(),
            requests: ConnectionTracker::new(),
        }
    }

    /// Returns the metrics path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the configured bind address.
    #[must_use]
    pub fn addr(&self) -> &str {
        self.http.addr()
    }

    /// Returns the embedded HTTP server settings.
    #[must_use]
    pub fn http_server(&self) -> &HttpServer {
        &self.http
    }

    /// Returns the lifecycle logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Returns the address the listener is bound to, once `run` has bound it.
    #[must_use]
    pub fn listener_addr(&self) -> Option<SocketAddr> {
        *self.listener_addr.lock()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.tracker.active_connections()
    }

    /// Returns the number of requests currently being handled.
    #[must_use]
    pub fn in_flight_requests(&self) -> usize {
        self.requests.active_connections()
    }

    /// Waits until `run` has either bound its listener or failed.
    ///
    /// Returns the listener address, or `None` if binding failed.
    pub async fn ready(&self) -> Option<SocketAddr> {
        let mut state = self.state.subscribe();
        if state.wait_for(|s| *s != State::Created).await.is_err() {
            return None;
        }
        self.listener_addr()
    }

    /// Binds the listener and serves until [`halt`](Self::halt) closes it.
    ///
    /// `scope` is attached to every request as part of its
    /// [`RequestContext`]; profile and trace collection stop early when it
    /// fires. Returns `Ok(())` when the listener was closed by `halt`.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyStarted`] if `run` was called before
    /// - [`ServerError::Bind`] if the listener cannot be bound
    /// - [`ServerError::Serve`] if accepting fails with a non-transient error
    pub async fn run(&self, scope: &Scope) -> Result<(), ServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyStarted);
        }
        let _closed = self.listener_closed.trigger_on_drop();

        let bind_addr = self.http.bind_addr();
        let listener = match TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.state.send_replace(State::Stopped);
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.state.send_replace(State::Stopped);
                return Err(ServerError::Serve(e));
            }
        };
        *self.listener_addr.lock() = Some(local_addr);

        let dispatcher = Arc::new(Dispatcher {
            router: Router::new(&self.path),
            context: RequestContext::new(local_addr, scope.clone()),
            prometheus: self
                .prometheus
                .clone()
                .unwrap_or_else(prometheus::global_handle),
            read_timeout: self.http.read_timeout(),
            write_timeout: self.http.write_timeout(),
        });

        self.logger.log(format_args!(
            "serving profiling and prometheus metrics over http on http://{}{}",
            local_addr, self.path
        ));
        self.state.send_replace(State::Serving);

        let result = self.accept_loop(listener, &dispatcher).await;

        if let Err(e) = &result {
            tracing::error!(error = %e, "accept loop failed");
            self.stop_after_failure(local_addr);
        }
        result
    }

    /// Ends serving after a fatal accept error. Logs the shutdown line unless
    /// a concurrent `halt` already did.
    fn stop_after_failure(&self, local_addr: SocketAddr) {
        self.shutdown.trigger();
        if self.transition(State::Serving, State::Stopped) {
            self.logger.log(format_args!(
                "stopping serving profiling and prometheus metrics over http on http://{}{}",
                local_addr, self.path
            ));
        }
    }

    /// Shuts the server down gracefully.
    ///
    /// Logs the shutdown line, stops accepting, then waits for open
    /// connections to finish their current request and close. If `scope`
    /// fires first, the remaining connections are dropped; when requests were
    /// still in flight [`ServerError::ShutdownCancelled`] is returned. The
    /// listener is closed either way.
    ///
    /// `halt` does not depend on the `run` future being polled: if `scope`
    /// fires while `run` still holds the listener, connections are dropped and
    /// `ShutdownCancelled` is returned; the listener closes once `run` is
    /// polled again or dropped.
    ///
    /// After `run` ended on a fatal accept error the server is already
    /// stopped (and has logged its shutdown line), so `halt` returns
    /// [`HaltOutcome::AlreadyStopped`].
    ///
    /// # Errors
    ///
    /// - [`ServerError::NotServing`] if the server never bound a listener
    /// - [`ServerError::ShutdownCancelled`] if `scope` fired while draining
    pub async fn halt(&self, scope: &Scope) -> Result<HaltOutcome, ServerError> {
        loop {
            match self.state() {
                State::Created => return Err(ServerError::NotServing),
                State::Stopped => {
                    return match self.listener_addr() {
                        Some(_) => Ok(HaltOutcome::AlreadyStopped),
                        None => Err(ServerError::NotServing),
                    };
                }
                State::ShuttingDown => {
                    return self
                        .wait_stopped(scope)
                        .await
                        .map(|()| HaltOutcome::AlreadyStopped);
                }
                State::Serving => {
                    if self.transition(State::Serving, State::ShuttingDown) {
                        break;
                    }
                }
            }
        }

        let listener_addr = self.listener_addr().ok_or(ServerError::NotServing)?;
        self.logger.log(format_args!(
            "stopping serving profiling and prometheus metrics over http on http://{}{}",
            listener_addr, self.path
        ));

        self.shutdown.trigger();
        if !self.wait_listener_closed(scope).await {
            let active = self.requests.active_connections();
            tracing::warn!(
                in_flight = active,
                "shutdown scope fired before the listener closed"
            );
            self.force.trigger();
            self.state.send_replace(State::Stopped);
            return Err(ServerError::ShutdownCancelled { active });
        }

        tracing::debug!(
            active = self.tracker.active_connections(),
            "listener closed, draining connections"
        );

        let result = tokio::select! {
            biased;
            () = self.tracker.wait_for_shutdown() => Ok(HaltOutcome::Graceful),
            () = scope.cancelled() => {
                let active = self.requests.active_connections();
                tracing::warn!(
                    connections = self.tracker.active_connections(),
                    in_flight = active,
                    "shutdown scope fired, closing remaining connections"
                );
                self.force.trigger();
                if active == 0 {
                    Ok(HaltOutcome::Graceful)
                } else {
                    Err(ServerError::ShutdownCancelled { active })
                }
            }
        };

        self.state.send_replace(State::Stopped);
        result
    }

    /// Waits for `run` to drop its listener. Returns `false` if `scope` fires
    /// and the listener is still open after [`LISTENER_CLOSE_GRACE`].
    async fn wait_listener_closed(&self, scope: &Scope) -> bool {
        let closed = self.listener_closed.recv();
        tokio::pin!(closed);

        tokio::select! {
            biased;
            () = &mut closed => return true,
            () = scope.cancelled() => {}
        }
        tokio::time::timeout(LISTENER_CLOSE_GRACE, closed).await.is_ok()
    }

    /// Waits for a concurrent `halt` to finish.
    async fn wait_stopped(&self, scope: &Scope) -> Result<(), ServerError> {
        let mut state = self.state.subscribe();
        tokio::select! {
            biased;
            _ = state.wait_for(|s| *s == State::Stopped) => Ok(()),
            () = scope.cancelled() => Err(ServerError::ShutdownCancelled {
                active: self.requests.active_connections(),
            }),
        }
    }

    /// Moves from `from` to `to`; returns `false` if the state was not `from`.
    fn transition(&self, from: State, to: State) -> bool {
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    async fn accept_loop(
        &self,
        listener: TcpListener,
        dispatcher: &Arc<Dispatcher>,
    ) -> Result<(), ServerError> {
        let shutdown = self.shutdown.recv();
        tokio::pin!(shutdown);
        let mut backoff: Option<Duration> = None;

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::debug!("shutdown requested, closing listener");
                    return Ok(());
                }

                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        backoff = None;
                        self.spawn_connection(stream, remote_addr, dispatcher);
                    }
                    Err(e) if is_transient(&e) => {
                        let delay = backoff.map_or(MIN_ACCEPT_BACKOFF, |d| (d * 2).min(MAX_ACCEPT_BACKOFF));
                        backoff = Some(delay);
                        tracing::warn!(error = %e, retry_in = ?delay, "accept error");

                        tokio::select! {
                            biased;
                            () = &mut shutdown => return Ok(()),
                            () = tokio::time::sleep(delay) => {}
                        }
                    }
                    Err(e) => return Err(ServerError::Serve(e)),
                }
            }
        }
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        remote_addr: SocketAddr,
        dispatcher: &Arc<Dispatcher>,
    ) {
        let token = self.tracker.acquire();
        let connection = Connection {
            dispatcher: Arc::clone(dispatcher),
            requests: self.requests.clone(),
            header_timeout: self.http.effective_header_timeout(),
            idle_timeout: self.http.effective_idle_timeout(),
        };
        let shutdown = self.shutdown.recv();
        let force = self.force.recv();

        tokio::spawn(async move {
            connection.serve(stream, remote_addr, shutdown, force).await;
            drop(token);
        });
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("path", &self.path)
            .field("http", &self.http)
            .field("state", &self.state())
            .field("listener_addr", &self.listener_addr())
            .finish_non_exhaustive()
    }
}

/// Accept errors that do not end the accept loop.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    ) || matches!(e.raw_os_error(), Some(ENFILE | EMFILE))
}

/// Per-connection settings and the shared dispatcher.
struct Connection {
    dispatcher: Arc<Dispatcher>,
    requests: ConnectionTracker,
    header_timeout: Option<Duration>,
    idle_timeout: Option<Duration>,
}

impl Connection {
    async fn serve(
        self,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: impl std::future::Future<Output = ()>,
        force: impl std::future::Future<Output = ()>,
    ) {
        let activity = Arc::new(Activity::new());
        let dispatcher = self.dispatcher;
        let requests = self.requests;
        let service_activity = Arc::clone(&activity);

        let service = service_fn(move |req: Request<Incoming>| {
            let dispatcher = Arc::clone(&dispatcher);
            let in_flight = requests.acquire();
            let busy = service_activity.begin();
            async move {
                let response = dispatcher.handle(req).await;
                drop(busy);
                drop(in_flight);
                Ok::<_, Infallible>(response)
            }
        });

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(true)
            .header_read_timeout(self.header_timeout);

        let conn = builder.serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn, shutdown, force);

        let mut draining = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(e) = result {
                        tracing::debug!(%remote_addr, error = %e, "connection error");
                    }
                    break;
                }
                () = &mut shutdown, if !draining => {
                    draining = true;
                    conn.as_mut().graceful_shutdown();
                }
                () = activity.idle(self.idle_timeout), if !draining => {
                    tracing::debug!(%remote_addr, "closing idle connection");
                    draining = true;
                    conn.as_mut().graceful_shutdown();
                }
                () = &mut force => {
                    tracing::debug!(%remote_addr, "connection closed by forced shutdown");
                    break;
                }
            }
        }
    }
}

/// Request activity on one connection, for the idle timeout.
#[derive(Debug)]
struct Activity {
    busy: AtomicUsize,
    last: Mutex<Instant>,
}

impl Activity {
    fn new() -> Self {
        Self {
            busy: AtomicUsize::new(0),
            last: Mutex::new(Instant::now()),
        }
    }

    fn begin(self: &Arc<Self>) -> BusyGuard {
        self.busy.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            activity: Arc::clone(self),
        }
    }

    /// Completes once no request has been active for `timeout`.
    async fn idle(&self, timeout: Option<Duration>) {
        let Some(timeout) = timeout else {
            return std::future::pending().await;
        };

        loop {
            if self.busy.load(Ordering::SeqCst) > 0 {
                tokio::time::sleep(timeout).await;
                continue;
            }
            let deadline = *self.last.lock() + timeout;
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }
}

struct BusyGuard {
    activity: Arc<Activity>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        *self.activity.last.lock() = Instant::now();
        self.activity.busy.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Routes requests to the exposition and profiling handlers.
struct Dispatcher {
    router: Router,
    context: RequestContext,
    prometheus: PrometheusHandle,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl Dispatcher {
    async fn handle<B>(&self, req: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes>,
        B::Error: fmt::Display,
    {
        let start = Instant::now();
        let _in_flight = InFlightGuard::new();
        let req = self.prepare(req);

        let method = req.method().clone();
        let path = req.uri().path().to_string();
        tracing::debug!(%method, %path, "dispatching request");

        let (route, response) = match self.router.match_route(&method, &path) {
            RouteOutcome::Matched(endpoint) => (endpoint.label(), self.serve(endpoint, req).await),
            RouteOutcome::MethodNotAllowed(allow) => {
                ("method_not_allowed", method_not_allowed(&allow))
            }
            RouteOutcome::NotFound => ("not_found", not_found()),
        };

        telemetry::record_request(route, response.status().as_u16(), start.elapsed());
        response
    }

    /// Attaches the request context handlers read the listener address and
    /// the run scope from.
    fn prepare<B>(&self, mut req: Request<B>) -> Request<B> {
        self.context.attach(&mut req);
        req
    }

    async fn serve<B>(&self, endpoint: Endpoint, req: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes>,
        B::Error: fmt::Display,
    {
        let scope = RequestContext::from_request(&req)
            .map_or_else(Scope::new, |ctx| ctx.scope().clone());
        let (parts, body) = req.into_parts();

        let body = match self.collect_body(body).await {
            Ok(body) => body,
            Err(response) => return response,
        };
        let query = parts.uri.query();

        let work = async {
            match endpoint {
                Endpoint::Metrics => prometheus::serve(&self.prometheus),
                Endpoint::PprofIndex => pprof::index(),
                Endpoint::PprofCmdline => pprof::cmdline(),
                Endpoint::PprofProfile => pprof::profile(query, self.write_timeout, &scope).await,
                Endpoint::PprofSymbol => pprof::symbol(&parts.method, query, &body),
                Endpoint::PprofTrace => pprof::trace(query, self.write_timeout, &scope).await,
            }
        };

        match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.unwrap_or_else(|_| {
                tracing::warn!(endpoint = endpoint.label(), "handler exceeded write timeout");
                text_response(StatusCode::SERVICE_UNAVAILABLE, "handler timed out\n")
            }),
            None => work.await,
        }
    }

    /// Collects the request body, bounded by the read timeout.
    async fn collect_body<B>(&self, body: B) -> Result<Bytes, HttpResponse>
    where
        B: Body<Data = Bytes>,
        B::Error: fmt::Display,
    {
        let collect = async { body.collect().await.map(http_body_util::Collected::to_bytes) };

        let result = match self.read_timeout {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("request body collection timed out");
                    return Err(text_response(
                        StatusCode::REQUEST_TIMEOUT,
                        "request body read timed out\n",
                    ));
                }
            },
            None => collect.await,
        };

        result.map_err(|e| {
            tracing::debug!(error = %e, "failed to read request body");
            text_response(StatusCode::BAD_REQUEST, "failed to read request body\n")
        })
    }
}

fn not_found() -> HttpResponse {
    text_response(StatusCode::NOT_FOUND, "404 page not found\n")
}

fn method_not_allowed(allow: &str) -> HttpResponse {
    let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed\n");
    if let Ok(value) = header::HeaderValue::from_str(allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

fn text_response(status: StatusCode, body: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
