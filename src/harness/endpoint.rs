//! Endpoint declarations consumed by the orchestrator.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::AuthLevel;
use crate::client::{CallError, RequestContext};

pub type CallFuture = Pin<Box<dyn Future<Output = Result<(), CallError>> + Send>>;

/// One SDK call: receives the shared client and the per-request context.
pub type EndpointCall<C> = Arc<dyn Fn(Arc<C>, RequestContext) -> CallFuture + Send + Sync>;

/// A single endpoint under test.
pub struct EndpointTest<C> {
    name: String,
    category: String,
    required_level: AuthLevel,
    call: EndpointCall<C>,
}

impl<C> EndpointTest<C> {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        category: impl Into<String>,
        required_level: AuthLevel,
        call: F,
    ) -> Self
    where
        F: Fn(Arc<C>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            category: category.into(),
            required_level,
            call: Arc::new(move |client, ctx| Box::pin(call(client, ctx))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn required_level(&self) -> AuthLevel {
        self.required_level
    }

    pub fn invoke(&self, client: Arc<C>, ctx: RequestContext) -> CallFuture {
        (self.call)(client, ctx)
    }
}

impl<C> Clone for EndpointTest<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            category: self.category.clone(),
            required_level: self.required_level,
            call: Arc::clone(&self.call),
        }
    }
}

impl<C> fmt::Debug for EndpointTest<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointTest")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("required_level", &self.required_level)
            .finish_non_exhaustive()
    }
}

/// The endpoint list of one SDK family.
pub struct EndpointSuite<C> {
    title: String,
    endpoints: Vec<EndpointTest<C>>,
}

impl<C> EndpointSuite<C> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            endpoints: Vec::new(),
        }
    }

    /// Declare an endpoint.
    pub fn endpoint<F, Fut>(
        mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        required_level: AuthLevel,
        call: F,
    ) -> Self
    where
        F: Fn(Arc<C>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallError>> + Send + 'static,
    {
        self.endpoints
            .push(EndpointTest::new(name, category, required_level, call));
        self
    }

    pub fn push(&mut self, test: EndpointTest<C>) {
        self.endpoints.push(test);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn endpoints(&self) -> &[EndpointTest<C>] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints in one category.
    pub fn category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a EndpointTest<C>> {
        self.endpoints.iter().filter(move |e| e.category == category)
    }
}

impl<C> fmt::Debug for EndpointSuite<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointSuite")
            .field("title", &self.title)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;

    struct Client;

    #[tokio::test]
    async fn test_suite_builder_and_invoke() {
        let suite = EndpointSuite::new("Spot REST")
            .endpoint("Ping", "General", AuthLevel::None, |_c: Arc<Client>, _ctx| async {
                Ok(())
            })
            .endpoint("Account", "Account", AuthLevel::UserData, |_c: Arc<Client>, _ctx| async {
                Err(CallError::http(403, ""))
            });

        assert_eq!(suite.len(), 2);
        assert_eq!(suite.category("General").count(), 1);
        assert_eq!(suite.endpoints()[1].required_level(), AuthLevel::UserData);

        let ctx = RequestContext::new(AuthContext::public());
        let client = Arc::new(Client);
        assert!(suite.endpoints()[0].invoke(client.clone(), ctx.clone()).await.is_ok());
        assert_eq!(
            suite.endpoints()[1].invoke(client, ctx).await.unwrap_err().status,
            Some(403)
        );
    }
}
