//! The Functions service: deployments and executions.

use tracing::instrument;

use appwrite_client::path::fill;
use appwrite_client::{
    CancellationToken, Client, Headers, InputFile, Params, ProgressCallback, RequestMethod,
    ResponseType, Result, UploadOptions,
};

use crate::models::{Deployment, Execution, ExecutionList};
use crate::{json_headers, require, with_list};

/// Functions API.
#[derive(Debug, Clone)]
pub struct Functions {
    client: Client,
    cancel: Option<CancellationToken>,
}

/// Input for [`Functions::create_execution`].
#[derive(Debug, Clone, Default)]
pub struct CreateExecution {
    /// Request body handed to the function.
    pub body: Option<String>,
    /// Queue the execution and return immediately.
    pub is_async: Option<bool>,
    /// Path the function sees, e.g. `/hooks/payment`.
    pub path: Option<String>,
    /// HTTP method the function sees.
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    /// ISO 8601 time for a delayed asynchronous execution.
    pub scheduled_at: Option<String>,
}

impl CreateExecution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn to_params(&self) -> Params {
        let params = Params::new()
            .with_opt("body", self.body.as_deref())
            .with_opt("async", self.is_async)
            .with_opt("path", self.path.as_deref())
            .with_opt("method", self.method.as_deref());

        let params = if self.headers.is_empty() {
            params
        } else {
            let headers = self
                .headers
                .iter()
                .fold(Params::new(), |acc, (name, value)| {
                    acc.with(name.as_str(), value.as_str())
                });
            params.with("headers", headers)
        };

        params.with_opt("scheduledAt", self.scheduled_at.as_deref())
    }
}

impl Functions {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            cancel: None,
        }
    }

    /// Abort uploads started by this service once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Upload a code archive (`.tar.gz`) as a new function deployment.
    #[instrument(skip(self, code, on_progress), fields(size = code.size()))]
    pub async fn create_deployment(
        &self,
        function_id: &str,
        code: InputFile,
        activate: bool,
        entrypoint: Option<&str>,
        commands: Option<&str>,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<Deployment> {
        require("functionId", function_id)?;

        let path = fill(
            "/functions/{functionId}/deployments",
            &[("functionId", function_id)],
        )?;
        let params = Params::new()
            .with_opt("entrypoint", entrypoint)
            .with_opt("commands", commands)
            .with("activate", activate);

        let mut upload = UploadOptions::new();
        if let Some(token) = &self.cancel {
            upload = upload.with_cancellation(token.clone());
        }

        self.client
            .chunked_upload(
                RequestMethod::Post,
                &path,
                Headers::new(),
                params,
                "code",
                code,
                upload,
                on_progress,
            )
            .await?
            .json()
    }

    /// Run a function.
    ///
    /// The server may answer with JSON or with a multipart body carrying the
    /// function's raw response; both decode into an [`Execution`].
    #[instrument(skip(self, execution))]
    pub async fn create_execution(
        &self,
        function_id: &str,
        execution: &CreateExecution,
    ) -> Result<Execution> {
        require("functionId", function_id)?;

        let path = fill(
            "/functions/{functionId}/executions",
            &[("functionId", function_id)],
        )?;
        self.client
            .call(
                RequestMethod::Post,
                &path,
                json_headers(),
                execution.to_params(),
                ResponseType::Json,
            )
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn get_execution(&self, function_id: &str, execution_id: &str) -> Result<Execution> {
        require("functionId", function_id)?;
        require("executionId", execution_id)?;

        let path = fill(
            "/functions/{functionId}/executions/{executionId}",
            &[("functionId", function_id), ("executionId", execution_id)],
        )?;
        self.client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                Params::new(),
                ResponseType::Json,
            )
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn list_executions(
        &self,
        function_id: &str,
        queries: Option<&[String]>,
    ) -> Result<ExecutionList> {
        require("functionId", function_id)?;

        let path = fill(
            "/functions/{functionId}/executions",
            &[("functionId", function_id)],
        )?;
        self.client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                with_list(Params::new(), "queries", queries),
                ResponseType::Json,
            )
            .await?
            .json()
    }
}
