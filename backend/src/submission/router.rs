use crate::storage::{blocking, FormStore, StoredForm};
use crate::submission::encode::{form_urlencoded, multipart_form, parse_body, parse_object};
use crate::submission::SubmitError;
use bytes::Bytes;
use common::model::destination::{ContentType, Destination, WebDestination};
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::{json, Value};
use std::io;
use std::path::PathBuf;

const JSON_MIME: &str = "application/json";

/// Terminal success states of a submission.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Written to the form's responses directory.
    Stored(PathBuf),
    /// Accepted by the remote endpoint with this status.
    Forwarded(StatusCode),
}

/// Sends each submission to the one sink its form is configured for.
///
/// Every submission is handled once: there is no internal retry, and a
/// rejected forward is reported back to the submitter as is.
#[derive(Clone)]
pub struct SubmissionRouter {
    store: FormStore,
    client: Client,
    aggregator_url: Url,
}

impl SubmissionRouter {
    pub fn new(store: FormStore, aggregator_url: Url) -> Self {
        Self {
            store,
            client: Client::new(),
            aggregator_url,
        }
    }

    /// Validates a posted submission and routes it by the destination of
    /// form `form_id`. The content type is checked before anything is read.
    pub async fn submit(
        &self,
        form_id: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<Outcome, SubmitError> {
        check_content_type(content_type)?;

        let store = self.store.clone();
        let id = form_id.to_string();
        let form = blocking(move || store.read_form(&id)).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SubmitError::FormNotFound(form_id.to_string())
            } else {
                SubmitError::StorageFailure(e)
            }
        })?;

        debug!("Submission of {} bytes for form {}", body.len(), form_id);
        self.route(form_id, &form, body).await
    }

    /// Dispatches an already validated submission.
    pub async fn route(&self, form_id: &str, form: &StoredForm, body: Bytes) -> Result<Outcome, SubmitError> {
        match Destination::from_value(form.destination.as_ref())? {
            Destination::Default => self.store_locally(form_id, body).await,
            Destination::Web(web) => self.forward_to_web(&web, body).await,
            Destination::Db(_) => {
                // the aggregation service gets the destination as stored
                let destination = form.destination.clone().unwrap_or(Value::Null);
                self.forward_to_aggregator(&form.schema, destination, body).await
            }
        }
    }

    async fn store_locally(&self, form_id: &str, body: Bytes) -> Result<Outcome, SubmitError> {
        let store = self.store.clone();
        let id = form_id.to_string();
        let path = blocking(move || store.write_submission(&id, &body)).await?;
        info!("Stored submission for form {} at {}", form_id, path.display());
        Ok(Outcome::Stored(path))
    }

    async fn forward_to_web(&self, web: &WebDestination, body: Bytes) -> Result<Outcome, SubmitError> {
        let content_type = web
            .content_type()
            .map_err(|_| SubmitError::UnsupportedContentType(web.content_type.clone()))?;

        let request = self.client.post(&web.url);
        let request = match content_type {
            ContentType::Json => {
                parse_body(&body)?;
                request.header(CONTENT_TYPE, JSON_MIME).body(body)
            }
            ContentType::FormUrlEncoded => {
                let fields = parse_object(&body)?;
                request
                    .header(CONTENT_TYPE, content_type.as_ref())
                    .body(form_urlencoded(&fields))
            }
            // the boundary is added to the header by reqwest
            ContentType::Multipart => request.multipart(multipart_form(&parse_object(&body)?)),
        };

        debug!("Forwarding submission to {} as {}", web.url, content_type);
        let response = request.send().await.map_err(|source| SubmitError::Transport {
            url: web.url.clone(),
            source,
        })?;
        let status = ensure_success(response).await?;
        info!("Forwarded submission to {} ({})", web.url, status);
        Ok(Outcome::Forwarded(status))
    }

    async fn forward_to_aggregator(
        &self,
        schema: &Value,
        destination: Value,
        body: Bytes,
    ) -> Result<Outcome, SubmitError> {
        let data = parse_body(&body)?;
        let payload = json!({
            "schema": schema,
            "destination": destination,
            "data": data,
        });

        debug!("Forwarding submission to aggregator {}", self.aggregator_url);
        let response = self
            .client
            .post(self.aggregator_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|source| SubmitError::Transport {
                url: self.aggregator_url.to_string(),
                source,
            })?;
        let status = ensure_success(response).await?;
        info!("Forwarded submission to aggregator ({})", status);
        Ok(Outcome::Forwarded(status))
    }
}

/// Only `application/json` is accepted; parameters such as `charset` are
/// ignored.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), SubmitError> {
    let essence = content_type.map(|ct| ct.split(';').next().unwrap_or_default().trim());
    match essence {
        Some(mime) if mime.eq_ignore_ascii_case(JSON_MIME) => Ok(()),
        _ => Err(SubmitError::InvalidContentType(content_type.map(str::to_string))),
    }
}

/// Turns a non-2xx answer into [`SubmitError::RemoteRejected`]. The
/// remote body is quoted unless it is an HTML page.
async fn ensure_success(response: Response) -> Result<StatusCode, SubmitError> {
    let status = response.status();
    if status.is_success() {
        return Ok(status);
    }

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    let mut message = format!("HTTP {}", status);
    if !is_html {
        let text = response.text().await.unwrap_or_default();
        if !text.is_empty() {
            message = format!("{}: {}", message, text);
        }
    }
    Err(SubmitError::RemoteRejected {
        status: status.as_u16(),
        message,
    })
}
