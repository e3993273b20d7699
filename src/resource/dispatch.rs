//! Action Dispatch
//!
//! Runs one invocation: registry lookup, request building, the optional
//! preceding action (deactivate before delete), the optional prior fetch
//! (read-modify-write updates), the main request and its interpretation.
//!
//! Every descriptor is built before the first request goes out, so a
//! validation problem never leaves a half-finished sequence behind. Steps run
//! strictly in order and the first failure ends the invocation.

use super::builder::{build, RequestDescriptor};
use super::interpreter::{interpret, merged_body, prior_fetch_base, Outcome};
use super::params::ParameterSet;
use super::registry::{lookup, Action, ActionSpec, ResourceKind};
use crate::error::OktaError;
use crate::okta::client::OktaClient;
use crate::okta::http::Transport;
use serde_json::{Map, Value};
use uuid::Uuid;

/// One requested operation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub kind: ResourceKind,
    pub action: Action,
    pub params: ParameterSet,
}

impl Invocation {
    pub fn new(kind: ResourceKind, action: Action, params: ParameterSet) -> Self {
        Self {
            kind,
            action,
            params,
        }
    }
}

/// A built request together with the spec that judges its response
#[derive(Debug, Clone)]
pub struct Step {
    pub spec: &'static ActionSpec,
    pub descriptor: RequestDescriptor,
}

/// Everything an invocation will send, built up front
#[derive(Debug, Clone)]
pub struct Plan {
    /// Action that must succeed first, e.g. deactivate before delete
    pub prelude: Option<Step>,
    pub main: Step,
}

impl Plan {
    /// Validate and build all steps for an invocation without sending anything
    pub fn for_invocation(invocation: &Invocation) -> Result<Self, OktaError> {
        let spec = lookup(invocation.kind, invocation.action)?;

        let prelude = match spec.precede_with {
            Some(action) => {
                let prelude_spec = lookup(invocation.kind, action)?;
                Some(Step {
                    spec: prelude_spec,
                    descriptor: build(prelude_spec, &invocation.params)?,
                })
            }
            None => None,
        };

        let main = Step {
            spec,
            descriptor: build(spec, &invocation.params)?,
        };

        Ok(Self { prelude, main })
    }
}

/// Execute an invocation against the client's organization
pub async fn run<T: Transport>(
    client: &OktaClient<T>,
    invocation: &Invocation,
) -> Result<Outcome, OktaError> {
    let invocation_id = Uuid::new_v4();
    let plan = Plan::for_invocation(invocation)?;

    tracing::info!(
        "[{}] {} {}: {} {}",
        invocation_id,
        invocation.kind,
        invocation.action,
        plan.main.descriptor.method,
        client.url_for(&plan.main.descriptor)
    );

    if let Some(prelude) = &plan.prelude {
        tracing::debug!(
            "[{}] running {} first",
            invocation_id,
            prelude.spec.action_name()
        );
        execute_step(client, prelude).await.inspect_err(|e| {
            tracing::error!("[{}] {} failed, stopping: {}", invocation_id, prelude.spec.action_name(), e);
        })?;
    }

    let main = if plan.main.spec.requires_prior_fetch {
        let fetch = plan.main.descriptor.prior_fetch();
        tracing::debug!("[{}] fetching current state: GET {}", invocation_id, client.url_for(&fetch));

        let base = prior_fetch_base(client.send(&fetch).await);
        let patch = plan
            .main
            .descriptor
            .body
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        Step {
            spec: plan.main.spec,
            descriptor: plan.main.descriptor.clone().with_body(merged_body(base, &patch)),
        }
    } else {
        plan.main
    };

    let outcome = execute_step(client, &main).await;
    match &outcome {
        Ok(result) => tracing::info!("[{}] {} {}", invocation_id, result.status, result.msg),
        Err(e) => tracing::error!("[{}] {}", invocation_id, e),
    }
    outcome
}

async fn execute_step<T: Transport>(client: &OktaClient<T>, step: &Step) -> Result<Outcome, OktaError> {
    let url = client.url_for(&step.descriptor);
    let response = client.send(&step.descriptor).await?;
    interpret(step.spec, &response, &url)
}
