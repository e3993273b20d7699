//! Okta Client
//!
//! Binds a transport and an API token to one organization's API root, and
//! turns request descriptors into wire requests.

use super::auth::ApiKey;
use super::http::{HttpRequest, ReqwestTransport, Transport, TransportResponse, DEFAULT_TIMEOUT};
use crate::error::{OktaError, TransportError, ValidationError};
use crate::resource::{dispatch, Invocation, Outcome, RequestDescriptor};
use std::time::Duration;

/// Default provider domain for organization URLs
pub const DEFAULT_PROVIDER_DOMAIN: &str = "okta.com";

/// Admin API root for an organization
pub fn organization_base_url(organization: &str, provider_domain: &str) -> String {
    format!(
        "https://{}-admin.{}/api/v1",
        organization.trim(),
        provider_domain.trim().trim_matches('.')
    )
}

/// Main Okta client
#[derive(Clone)]
pub struct OktaClient<T = ReqwestTransport> {
    base_url: String,
    api_key: ApiKey,
    transport: T,
}

impl OktaClient<ReqwestTransport> {
    /// Create a client for `https://{organization}-admin.{provider_domain}/api/v1`
    pub fn for_organization(
        organization: &str,
        provider_domain: &str,
        api_key: ApiKey,
        timeout: Option<Duration>,
    ) -> Result<Self, OktaError> {
        if organization.trim().is_empty() {
            return Err(ValidationError::MissingParameter("organization".to_string()).into());
        }

        let transport = ReqwestTransport::new(timeout.unwrap_or(DEFAULT_TIMEOUT))?;
        let base_url = organization_base_url(organization, provider_domain);
        Ok(Self::with_transport(&base_url, api_key, transport)?)
    }
}

impl<T: Transport> OktaClient<T> {
    /// Create a client against an explicit API root (proxies, tests)
    pub fn with_transport(base_url: &str, api_key: ApiKey, transport: T) -> Result<Self, ValidationError> {
        if api_key.is_empty() {
            return Err(ValidationError::MissingParameter("api_key".to_string()));
        }

        let parsed = url::Url::parse(base_url).map_err(|_| ValidationError::InvalidValue {
            name: "base_url".to_string(),
            expected: "absolute URL".to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ValidationError::InvalidValue {
                name: "base_url".to_string(),
                expected: "absolute URL".to_string(),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Effective URL of a descriptor
    pub fn url_for(&self, descriptor: &RequestDescriptor) -> String {
        format!("{}{}", self.base_url, descriptor.path_and_query())
    }

    /// Wire request for a descriptor, with auth and JSON headers
    pub fn http_request(&self, descriptor: &RequestDescriptor) -> HttpRequest {
        HttpRequest {
            method: descriptor.method,
            url: self.url_for(descriptor),
            headers: vec![
                (
                    "Authorization".to_string(),
                    self.api_key.authorization_header(),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: descriptor.body.as_ref().map(|b| b.to_string()),
        }
    }

    /// Send one descriptor and return the raw response
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let request = self.http_request(descriptor);
        self.transport.execute(&request).await
    }

    /// Run one invocation end to end
    pub async fn invoke(&self, invocation: &Invocation) -> Result<Outcome, OktaError> {
        dispatch::run(self, invocation).await
    }
}
