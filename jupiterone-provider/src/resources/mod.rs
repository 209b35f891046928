//! Managed resource types
//!
//! Each resource implements [`Resource`] over its own typed model.
//! [`JsonResource`] erases the model so the provider can hand out every
//! resource as a [`DynResource`] working on plain JSON config and state.

pub mod payload;
pub mod question;
pub mod rule;

use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub use question::{QueryModel, QuestionModel, QuestionResource, QUESTION_TYPE_NAME};
pub use rule::{OperationModel, RuleModel, RuleQuestion, RuleResource, RULE_TYPE_NAME};

/// CRUD lifecycle of a remote object
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Clone + Send + Sync + 'static;

    fn type_name(&self) -> &'static str;

    /// Decode and validate configuration or stored state
    fn decode(&self, value: &JsonValue) -> Result<Self::Model, Diagnostics>;

    /// Render a model as state
    fn encode(&self, model: &Self::Model) -> JsonValue;

    async fn create(&self, plan: Self::Model) -> ProviderResult<Self::Model>;

    /// `Ok(None)` when the object no longer exists remotely
    async fn read(&self, state: Self::Model) -> ProviderResult<Option<Self::Model>>;

    async fn update(&self, plan: Self::Model, state: Self::Model) -> ProviderResult<Self::Model>;

    /// Deleting an object that is already gone succeeds
    async fn delete(&self, state: Self::Model) -> ProviderResult<()>;
}

/// A resource driven entirely through JSON values
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Diagnostics for a configuration, without contacting the API
    fn validate(&self, config: &JsonValue) -> Diagnostics;

    async fn create(&self, config: &JsonValue) -> ProviderResult<JsonValue>;

    async fn read(&self, state: &JsonValue) -> ProviderResult<Option<JsonValue>>;

    async fn update(&self, config: &JsonValue, state: &JsonValue) -> ProviderResult<JsonValue>;

    async fn delete(&self, state: &JsonValue) -> ProviderResult<()>;
}

/// Adapter exposing a typed [`Resource`] as a [`DynResource`]
pub struct JsonResource<R> {
    inner: R,
}

impl<R: Resource> JsonResource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn decode(&self, value: &JsonValue) -> ProviderResult<R::Model> {
        self.inner.decode(value).map_err(ProviderError::Invalid)
    }
}

#[async_trait]
impl<R: Resource> DynResource for JsonResource<R> {
    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    fn validate(&self, config: &JsonValue) -> Diagnostics {
        match self.inner.decode(config) {
            Ok(_) => Diagnostics::new(),
            Err(diagnostics) => diagnostics,
        }
    }

    async fn create(&self, config: &JsonValue) -> ProviderResult<JsonValue> {
        let plan = self.decode(config)?;
        let created = self.inner.create(plan).await?;
        Ok(self.inner.encode(&created))
    }

    async fn read(&self, state: &JsonValue) -> ProviderResult<Option<JsonValue>> {
        let state = self.decode(state)?;
        let current = self.inner.read(state).await?;
        Ok(current.map(|model| self.inner.encode(&model)))
    }

    async fn update(&self, config: &JsonValue, state: &JsonValue) -> ProviderResult<JsonValue> {
        let plan = self.decode(config)?;
        let state = self.decode(state)?;
        let updated = self.inner.update(plan, state).await?;
        Ok(self.inner.encode(&updated))
    }

    async fn delete(&self, state: &JsonValue) -> ProviderResult<()> {
        let state = self.decode(state)?;
        self.inner.delete(state).await
    }
}
