//! The Sites service: deployments of static and SSR sites.

use bytes::Bytes;
use tracing::instrument;

use appwrite_client::path::fill;
use appwrite_client::{
    CancellationToken, Client, Headers, InputFile, Params, ProgressCallback, RequestMethod,
    ResponseType, Result, UploadOptions,
};

use crate::models::{Deployment, DeploymentList};
use crate::{json_headers, require, with_list};

/// Sites API.
#[derive(Debug, Clone)]
pub struct Sites {
    client: Client,
    cancel: Option<CancellationToken>,
}

/// Build settings for a new site deployment.
#[derive(Debug, Clone, Default)]
pub struct CreateSiteDeployment {
    pub install_command: Option<String>,
    pub build_command: Option<String>,
    pub output_directory: Option<String>,
}

impl CreateSiteDeployment {
    fn to_params(&self, activate: bool) -> Params {
        Params::new()
            .with_opt("installCommand", self.install_command.as_deref())
            .with_opt("buildCommand", self.build_command.as_deref())
            .with_opt("outputDirectory", self.output_directory.as_deref())
            .with("activate", activate)
    }
}

/// Which archive [`Sites::get_deployment_download`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentDownloadType {
    /// The uploaded source code.
    Source,
    /// The build output.
    Output,
}

impl DeploymentDownloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentDownloadType::Source => "source",
            DeploymentDownloadType::Output => "output",
        }
    }
}

impl Sites {
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

    /// Upload a code archive (`.tar.gz`) as a new deployment.
    #[instrument(skip(self, code, options, on_progress), fields(size = code.size()))]
    pub async fn create_deployment(
        &self,
        site_id: &str,
        code: InputFile,
        activate: bool,
        options: &CreateSiteDeployment,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<Deployment> {
        require("siteId", site_id)?;

        let path = fill("/sites/{siteId}/deployments", &[("siteId", site_id)])?;
        let mut upload = UploadOptions::new();
        if let Some(token) = &self.cancel {
            upload = upload.with_cancellation(token.clone());
        }

        self.client
            .chunked_upload(
                RequestMethod::Post,
                &path,
                Headers::new(),
                options.to_params(activate),
                "code",
                code,
                upload,
                on_progress,
            )
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn get_deployment(&self, site_id: &str, deployment_id: &str) -> Result<Deployment> {
        let path = deployment_path(site_id, deployment_id, "")?;
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
    pub async fn list_deployments(
        &self,
        site_id: &str,
        queries: Option<&[String]>,
        search: Option<&str>,
    ) -> Result<DeploymentList> {
        require("siteId", site_id)?;

        let path = fill("/sites/{siteId}/deployments", &[("siteId", site_id)])?;
        let params = with_list(Params::new(), "queries", queries).with_opt("search", search);
        self.client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                params,
                ResponseType::Json,
            )
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn delete_deployment(&self, site_id: &str, deployment_id: &str) -> Result<()> {
        let path = deployment_path(site_id, deployment_id, "")?;
        self.client
            .call(
                RequestMethod::Delete,
                &path,
                json_headers(),
                Params::new(),
                ResponseType::Json,
            )
            .await?;
        Ok(())
    }

    /// Download a deployment's source or build output archive.
    #[instrument(skip(self))]
    pub async fn get_deployment_download(
        &self,
        site_id: &str,
        deployment_id: &str,
        download_type: Option<DeploymentDownloadType>,
    ) -> Result<Bytes> {
        let path = deployment_path(site_id, deployment_id, "/download")?;
        let params = Params::new().with_opt("type", download_type.map(|t| t.as_str()));
        let response = self
            .client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                params,
                ResponseType::Bytes,
            )
            .await?;
        Ok(response.into_bytes())
    }
}

fn deployment_path(site_id: &str, deployment_id: &str, suffix: &str) -> Result<String> {
    require("siteId", site_id)?;
    require("deploymentId", deployment_id)?;
    let path = fill(
        "/sites/{siteId}/deployments/{deploymentId}",
        &[("siteId", site_id), ("deploymentId", deployment_id)],
    )?;
    Ok(path + suffix)
}
