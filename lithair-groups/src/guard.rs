//! Group guard - request-boundary membership check
//!
//! Denies with `403 Forbidden` and an empty body unless the authenticated
//! principal belongs to at least one of the required groups. Guests are
//! always denied, and so is any request whose check fails.
//!
//! Example:
//! ```ignore
//! let guard = GroupGuard::new(evaluator, "admins|editors");
//! let response = guard.handle(req, |req| async move { handler(req).await }).await;
//! ```

use crate::config::GuardConfig;
use crate::evaluator::MembershipEvaluator;
use crate::model::EntityId;
use bytes::Bytes;
use http::{Extensions, HeaderMap};
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use std::future::Future;
use std::sync::Arc;

type Resp = Response<Full<Bytes>>;

/// Result of a guard check
#[derive(Debug)]
pub enum GuardResult {
    /// Request is allowed, continue to handler
    Allow,
    /// Request is denied, return this response
    Deny(Resp),
}

impl GuardResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardResult::Allow)
    }
}

/// Authenticated principal, inserted into request extensions by the
/// authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub EntityId);

/// Finds the authenticated principal of a request. `None` means guest
#[async_trait::async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap, extensions: &Extensions) -> Option<EntityId>;
}

/// Reads the [`Principal`] request extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionResolver;

#[async_trait::async_trait]
impl PrincipalResolver for ExtensionResolver {
    async fn resolve(&self, _headers: &HeaderMap, extensions: &Extensions) -> Option<EntityId> {
        extensions.get::<Principal>().map(|principal| principal.0.clone())
    }
}

/// Group names a request must match (any of them)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredGroups(Vec<String>);

impl RequiredGroups {
    /// Split a delimited list such as `"admins|editors"`. Blank segments
    /// are dropped
    pub fn parse(list: &str, delimiter: &str) -> Self {
        Self(
            list.split(delimiter)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RequiredGroups {
    fn from(list: &str) -> Self {
        Self::parse(list, &GuardConfig::default().delimiter)
    }
}

impl From<Vec<String>> for RequiredGroups {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for RequiredGroups {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

/// Middleware-style guard over [`MembershipEvaluator::has_group`]
#[derive(Clone)]
pub struct GroupGuard {
    required: RequiredGroups,
    evaluator: MembershipEvaluator,
    resolver: Arc<dyn PrincipalResolver>,
}

impl GroupGuard {
    pub fn new(evaluator: MembershipEvaluator, required: impl Into<RequiredGroups>) -> Self {
        Self { required: required.into(), evaluator, resolver: Arc::new(ExtensionResolver) }
    }

    /// Parse `groups` with the configured delimiter
    pub fn from_config(evaluator: MembershipEvaluator, groups: &str, config: &GuardConfig) -> Self {
        Self::new(evaluator, RequiredGroups::parse(groups, &config.delimiter))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn PrincipalResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn required(&self) -> &RequiredGroups {
        &self.required
    }

    /// Decide without consuming the request
    pub async fn check<B>(&self, req: &Request<B>) -> GuardResult {
        let Some(user) = self.resolver.resolve(req.headers(), req.extensions()).await else {
            log::warn!("guest denied on {} {}", req.method(), req.uri().path());
            return GuardResult::Deny(forbidden());
        };

        match self.evaluator.has_group(&user, self.required.names().to_vec(), false).await {
            Ok(true) => GuardResult::Allow,
            Ok(false) => {
                log::warn!(
                    "user {} denied on {}: not in any of {:?}",
                    user,
                    req.uri().path(),
                    self.required.names()
                );
                GuardResult::Deny(forbidden())
            }
            Err(err) => {
                log::warn!("membership check failed for user {}, denying: {}", user, err);
                GuardResult::Deny(forbidden())
            }
        }
    }

    /// Run `next` with the unchanged request when allowed, otherwise return
    /// the deny response
    pub async fn handle<B, F, Fut>(&self, req: Request<B>, next: F) -> Resp
    where
        F: FnOnce(Request<B>) -> Fut,
        Fut: Future<Output = Resp>,
    {
        match self.check(&req).await {
            GuardResult::Allow => next(req).await,
            GuardResult::Deny(response) => response,
        }
    }
}

fn forbidden() -> Resp {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::FORBIDDEN;
    response
}
