//! The Storage service: buckets of files.

use bytes::Bytes;
use tracing::{debug, instrument};

use appwrite_client::path::fill;
use appwrite_client::{
    CancellationToken, Client, Headers, InputFile, Params, ProgressCallback, RequestMethod,
    ResponseBody, ResponseType, Result, UploadOptions,
};

use crate::models::{File, FileList};
use crate::{json_headers, require, with_list, ID};

/// Storage API.
#[derive(Debug, Clone)]
pub struct Storage {
    client: Client,
    cancel: Option<CancellationToken>,
}

/// Image transformations for [`Storage::get_file_preview`].
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Crop anchor, e.g. `center` or `top-left`.
    pub gravity: Option<String>,
    /// 0 to 100.
    pub quality: Option<u32>,
    pub border_width: Option<u32>,
    /// Hex color without the leading `#`.
    pub border_color: Option<String>,
    pub border_radius: Option<u32>,
    /// 0.0 to 1.0.
    pub opacity: Option<f64>,
    /// Degrees, 0 to 360.
    pub rotation: Option<u32>,
    pub background: Option<String>,
    /// Output format such as `webp` or `png`.
    pub output: Option<String>,
}

impl PreviewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn output(mut self, format: impl Into<String>) -> Self {
        self.output = Some(format.into());
        self
    }

    fn to_params(&self) -> Params {
        Params::new()
            .with_opt("width", self.width)
            .with_opt("height", self.height)
            .with_opt("gravity", self.gravity.as_deref())
            .with_opt("quality", self.quality)
            .with_opt("borderWidth", self.border_width)
            .with_opt("borderColor", self.border_color.as_deref())
            .with_opt("borderRadius", self.border_radius)
            .with_opt("opacity", self.opacity)
            .with_opt("rotation", self.rotation)
            .with_opt("background", self.background.as_deref())
            .with_opt("output", self.output.as_deref())
    }
}

impl Storage {
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

    /// Upload a file, chunk by chunk.
    ///
    /// With a custom `file_id` the upload resumes where an earlier attempt
    /// stopped: the existing file is looked up first and the chunks the
    /// server already holds are skipped. A file that is already complete is
    /// returned as is.
    #[instrument(skip(self, file, permissions, on_progress), fields(size = file.size()))]
    pub async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
        permissions: Option<&[String]>,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<File> {
        require("bucketId", bucket_id)?;
        require("fileId", file_id)?;

        let path = fill("/storage/buckets/{bucketId}/files", &[("bucketId", bucket_id)])?;
        let params = with_list(Params::new().with("fileId", file_id), "permissions", permissions);

        let mut options = UploadOptions::new();
        if let Some(token) = &self.cancel {
            options = options.with_cancellation(token.clone());
        }

        let mut existing = None;
        if !ID::is_unique(file_id) {
            match self.get_file(bucket_id, file_id).await {
                Ok(found) => {
                    debug!(
                        chunks_uploaded = found.chunks_uploaded,
                        "Resuming upload of existing file"
                    );
                    options = options.resume(found.id.clone(), found.chunks_uploaded);
                    existing = Some(found);
                }
                Err(e) => debug!(error = %e, "No upload to resume"),
            }
        }

        let response = self
            .client
            .chunked_upload(
                RequestMethod::Post,
                &path,
                Headers::new(),
                params,
                "file",
                file,
                options,
                on_progress,
            )
            .await?;

        match (response, existing) {
            (ResponseBody::Json(serde_json::Value::Null), Some(file)) => Ok(file),
            (response, _) => response.json(),
        }
    }

    /// Get a file's metadata.
    #[instrument(skip(self))]
    pub async fn get_file(&self, bucket_id: &str, file_id: &str) -> Result<File> {
        let path = file_path(bucket_id, file_id, "")?;
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

    /// List the files of a bucket.
    #[instrument(skip(self))]
    pub async fn list_files(
        &self,
        bucket_id: &str,
        queries: Option<&[String]>,
        search: Option<&str>,
    ) -> Result<FileList> {
        require("bucketId", bucket_id)?;

        let path = fill("/storage/buckets/{bucketId}/files", &[("bucketId", bucket_id)])?;
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

    /// Delete a file.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        let path = file_path(bucket_id, file_id, "")?;
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

    /// Download a file's content as an attachment.
    #[instrument(skip(self))]
    pub async fn get_file_download(&self, bucket_id: &str, file_id: &str) -> Result<Bytes> {
        self.get_bytes(file_path(bucket_id, file_id, "/download")?, Params::new())
            .await
    }

    /// Get a file's content for display in the browser.
    #[instrument(skip(self))]
    pub async fn get_file_view(&self, bucket_id: &str, file_id: &str) -> Result<Bytes> {
        self.get_bytes(file_path(bucket_id, file_id, "/view")?, Params::new())
            .await
    }

    /// Get a resized or transformed preview of an image file.
    #[instrument(skip(self))]
    pub async fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<Bytes> {
        self.get_bytes(file_path(bucket_id, file_id, "/preview")?, options.to_params())
            .await
    }

    async fn get_bytes(&self, path: String, params: Params) -> Result<Bytes> {
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

fn file_path(bucket_id: &str, file_id: &str, suffix: &str) -> Result<String> {
    require("bucketId", bucket_id)?;
    require("fileId", file_id)?;
    let path = fill(
        "/storage/buckets/{bucketId}/files/{fileId}",
        &[("bucketId", bucket_id), ("fileId", file_id)],
    )?;
    Ok(path + suffix)
}
