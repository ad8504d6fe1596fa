// ABOUTME: Functional verifier: proves the deployed API works end to end.
// ABOUTME: Only the health wait is retried; create, fetch and compare run exactly once.

use super::{ApiClient, ApiMethod, ApiRequest, ApiResponse, NewProduct, ProductRecord};
use crate::diagnostics::Warning;
use crate::pipeline::{StageError, StageResult};
use crate::poll::{PollOutcome, PollPolicy, Probe, ProbeError, ProbeResult, ReadinessPoller};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Ready when `GET url` answers 200.
pub struct HttpHealthProbe<C> {
    client: C,
    url: String,
}

impl<C: ApiClient> HttpHealthProbe<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<C: ApiClient> Probe for HttpHealthProbe<C> {
    async fn check(&self, _cancel: &CancellationToken) -> ProbeResult {
        let response = self
            .client
            .send(ApiRequest::get(self.url.as_str()))
            .await
            .map_err(|e| ProbeError(e.to_string()))?;
        Ok(response.status == 200)
    }

    fn describe(&self) -> &str {
        &self.url
    }
}

/// Drives a create-then-read workflow against the product API.
pub struct FunctionalVerifier<C> {
    client: C,
    health: PollPolicy,
    product: NewProduct,
}

impl<C: ApiClient> FunctionalVerifier<C> {
    pub fn new(client: C, health: PollPolicy, product: NewProduct) -> Self {
        Self {
            client,
            health,
            product,
        }
    }

    /// Verify the service at `base_url`.
    ///
    /// A health timeout is a hard failure: an unreachable API cannot heal by
    /// itself. The created product is deleted afterwards whether or not the
    /// read-back matched; a failed delete only produces a warning.
    pub async fn verify(
        &self,
        base_url: &str,
        cancel: &CancellationToken,
    ) -> StageResult<ProductRecord> {
        let base = base_url.trim_end_matches('/');

        let health_url = format!("{}/health", base);
        let probe = HttpHealthProbe::new(&self.client, health_url.as_str());
        match ReadinessPoller::new(self.health).poll(&probe, cancel).await {
            PollOutcome::Ready { attempts } => {
                tracing::info!(url = %health_url, attempts, "API is ready");
            }
            PollOutcome::Cancelled { .. } => return StageResult::HardFailure(StageError::Cancelled),
            PollOutcome::TimedOut {
                attempts,
                last_error,
                ..
            } => {
                return StageResult::HardFailure(StageError::NotReady {
                    target: health_url,
                    attempts,
                    last_error,
                });
            }
        }

        let id = match self.create(base, cancel).await {
            Ok(id) => id,
            Err(e) => return StageResult::HardFailure(e),
        };
        tracing::info!(id = %id, "product created");

        let checked = self.read_back(base, &id, cancel).await;

        let mut warnings = Vec::new();
        if !cancel.is_cancelled()
            && let Err(e) = self.delete(base, &id, cancel).await
        {
            warnings.push(Warning::cleanup_failed(format!(
                "could not delete verification product {}: {}",
                id, e
            )));
        }

        match checked {
            Ok(record) => StageResult::with_warnings(record, warnings),
            Err(e) => {
                for warning in &warnings {
                    tracing::warn!("{}", warning);
                }
                StageResult::HardFailure(e)
            }
        }
    }

    /// POST the fixed payload and return the id the service assigned.
    async fn create(&self, base: &str, cancel: &CancellationToken) -> Result<String, StageError> {
        let url = format!("{}/products", base);
        let request = ApiRequest::post_json(url.as_str(), &self.product).map_err(|source| {
            StageError::Request {
                url: url.clone(),
                source,
            }
        })?;

        let response = self.send(request, cancel).await?;
        let record: ProductRecord = parse(&url, ApiMethod::Post, &response)?;

        record
            .identifier()
            .map(str::to_string)
            .ok_or(StageError::NoIdentifier)
    }

    /// GET the product back and compare it with what was submitted.
    async fn read_back(
        &self,
        base: &str,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<ProductRecord, StageError> {
        let url = product_url(base, id);
        let response = self.send(ApiRequest::get(url.as_str()), cancel).await?;
        let record: ProductRecord = parse(&url, ApiMethod::Get, &response)?;

        let fetched_id = record.id.clone().unwrap_or_default();
        if fetched_id != id {
            return Err(StageError::IntegrityViolation {
                field: "id",
                expected: id.to_string(),
                actual: fetched_id,
            });
        }

        let fetched_name = record.name.clone().unwrap_or_default();
        if fetched_name != self.product.name {
            return Err(StageError::IntegrityViolation {
                field: "name",
                expected: self.product.name.clone(),
                actual: fetched_name,
            });
        }

        Ok(record)
    }

    async fn delete(&self, base: &str, id: &str, cancel: &CancellationToken) -> Result<(), StageError> {
        let url = product_url(base, id);
        let response = self.send(ApiRequest::delete(url.as_str()), cancel).await?;
        if !response.is_success() {
            return Err(StageError::UnexpectedStatus {
                method: ApiMethod::Delete.as_str(),
                url,
                status: response.status,
            });
        }
        Ok(())
    }

    async fn send(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, StageError> {
        let url = request.url.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StageError::Cancelled),
            result = self.client.send(request) => {
                result.map_err(|source| StageError::Request { url, source })
            }
        }
    }
}

fn product_url(base: &str, id: &str) -> String {
    format!("{}/products/{}", base, urlencoding::encode(id))
}

fn parse(url: &str, method: ApiMethod, response: &ApiResponse) -> Result<ProductRecord, StageError> {
    if !response.is_success() {
        return Err(StageError::UnexpectedStatus {
            method: method.as_str(),
            url: url.to_string(),
            status: response.status,
        });
    }

    response.json().map_err(|e| StageError::InvalidResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
