//! # Interceptors Container
//!
//! Immutable registry mapping topic → interceptor, built once at startup by
//! a container factory and then shared read-only with the transport.
//!
//! ## Factories
//!
//! - `ShardInterceptorsContainerFactory`: topics for a shard node
//! - `MetaInterceptorsContainerFactory`: topics for a meta-chain node
//!
//! Both resolve every dependency before wiring the first topic and build
//! the container all-or-nothing: a failed `create` unregisters whatever it
//! had already registered with the messenger.

pub mod args;
pub mod base;
pub mod meta;
pub mod shard;

pub use args::{InterceptorsContainerFactoryArgs, ResolvedArgs};
pub use base::{ShardRange, TopicPlan};
pub use meta::MetaInterceptorsContainerFactory;
pub use shard::ShardInterceptorsContainerFactory;

use crate::domain::TopicFamily;
use crate::ports::MessageProcessor;
use shared_types::{ContainerError, KeyedContainer};
use std::fmt;
use std::sync::Arc;

/// Topic → interceptor registry.
#[derive(Default)]
pub struct InterceptorsContainer {
    inner: KeyedContainer<String, Arc<dyn MessageProcessor>>,
}

impl InterceptorsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on a duplicate topic; the first interceptor stays.
    pub fn add(
        &mut self,
        topic: impl Into<String>,
        interceptor: Arc<dyn MessageProcessor>,
    ) -> Result<(), ContainerError> {
        self.inner.add(topic.into(), interceptor)
    }

    pub fn add_multiple(
        &mut self,
        topics: Vec<String>,
        interceptors: Vec<Arc<dyn MessageProcessor>>,
    ) -> Result<(), ContainerError> {
        self.inner.add_multiple(topics, interceptors)
    }

    pub fn get(&self, topic: &str) -> Result<&Arc<dyn MessageProcessor>, ContainerError> {
        self.inner.get(&topic.to_string())
    }

    /// Topics in registration order.
    pub fn topics(&self) -> &[String] {
        self.inner.keys()
    }

    /// Topics belonging to `family`.
    pub fn topics_of(&self, family: TopicFamily) -> Vec<&str> {
        self.topics()
            .iter()
            .filter(|t| TopicFamily::parse(t) == Some(family))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for InterceptorsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorsContainer")
            .field("topics", &self.topics())
            .finish()
    }
}
