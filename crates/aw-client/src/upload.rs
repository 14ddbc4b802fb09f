//! Chunked, resumable uploads of large files.
//!
//! A source of known size is cut into fixed-size chunks. Each chunk is sent
//! as a multipart file part together with the call's other parameters:
//!
//! - every chunk of a multi-chunk upload carries
//!   `content-range: bytes {start}-{end}/{total}`
//! - every chunk after the server assigned an id carries `x-appwrite-id`
//! - a single-chunk upload is a plain multipart request
//!
//! Only one chunk is held in memory at a time, whatever the source size.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::appwrite_client::{headers, Client};
use crate::error::{Error, ErrorKind, Result};
use crate::params::{FilePayload, Params};
use crate::request::{Headers, Request, RequestMethod};
use crate::response::ResponseBody;

/// Callback receiving one [`UploadProgress`] per uploaded chunk.
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(UploadProgress) + Send);

/// Progress snapshot emitted after each chunk completes.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    /// Server-assigned resource id, once known.
    pub id: Option<String>,
    /// Percentage of the source uploaded, 0.0 to 100.0.
    pub progress: f64,
    /// Bytes of the source uploaded so far.
    pub size_uploaded: u64,
    /// Total chunks, as reported by the server.
    pub chunks_total: u64,
    /// Chunks the server has received, as reported by the server.
    pub chunks_uploaded: u64,
}

/// Per-call upload settings.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Chunks already stored by the server from an interrupted upload.
    pub chunks_already_uploaded: u64,
    /// Resource id of the interrupted upload being resumed.
    pub resource_id: Option<String>,
    /// Checked before every chunk is sent.
    pub cancel: Option<CancellationToken>,
}

impl UploadOptions {
    /// Options for a fresh upload starting at the first chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume an interrupted upload of `resource_id` after `chunks` chunks.
    pub fn resume(mut self, resource_id: impl Into<String>, chunks: u64) -> Self {
        self.resource_id = Some(resource_id.into());
        self.chunks_already_uploaded = chunks;
        self
    }

    /// Stop the upload before the next chunk once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

enum Source {
    Bytes(Bytes),
    Path(PathBuf),
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

/// A file to upload: a name, an optional MIME type and a sized byte source.
pub struct InputFile {
    filename: String,
    mime_type: Option<String>,
    size: u64,
    source: Source,
}

impl std::fmt::Debug for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            Source::Bytes(_) => "bytes".to_string(),
            Source::Path(path) => path.display().to_string(),
            Source::Reader(_) => "reader".to_string(),
        };
        f.debug_struct("InputFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .field("source", &source)
            .finish()
    }
}

impl InputFile {
    /// Upload an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        let bytes = bytes.into();
        Self {
            filename: filename.into(),
            mime_type: None,
            size: bytes.len() as u64,
            source: Source::Bytes(bytes),
        }
    }

    /// Upload a file from disk. The file is read one chunk at a time.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self {
            filename,
            mime_type: None,
            size: metadata.len(),
            source: Source::Path(path.to_path_buf()),
        })
    }

    /// Upload from an async reader yielding exactly `size` bytes.
    pub fn from_reader<R>(reader: R, size: u64, filename: impl Into<String>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            filename: filename.into(),
            mime_type: None,
            size,
            source: Source::Reader(Box::new(reader)),
        }
    }

    /// Upload from a stream of byte buffers totalling `size` bytes.
    pub fn from_stream<S>(stream: S, size: u64, filename: impl Into<String>) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + Unpin + 'static,
    {
        Self::from_reader(tokio_util::io::StreamReader::new(stream), size, filename)
    }

    /// Set the MIME type sent with every file part.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Filename sent in the multipart disposition.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared size of the source in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The MIME type, if one was set.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Open the source positioned `skip` bytes in.
    async fn open(self, skip: u64) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        match self.source {
            Source::Bytes(bytes) => {
                let skip = skip.min(bytes.len() as u64) as usize;
                Ok(Box::new(std::io::Cursor::new(bytes.slice(skip..))))
            }
            Source::Path(path) => {
                let mut file = tokio::fs::File::open(&path).await?;
                if skip > 0 {
                    file.seek(SeekFrom::Start(skip)).await?;
                }
                Ok(Box::new(file))
            }
            Source::Reader(mut reader) => {
                if skip > 0 {
                    let discarded =
                        tokio::io::copy(&mut (&mut reader).take(skip), &mut tokio::io::sink())
                            .await?;
                    if discarded < skip {
                        return Err(short_source(discarded, self.size));
                    }
                }
                Ok(reader)
            }
        }
    }
}

fn short_source(read: u64, declared: u64) -> Error {
    Error::new(ErrorKind::Upload(format!(
        "source ended after {} of {} declared bytes",
        read, declared
    )))
}

/// One chunk of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// 1-based chunk index.
    pub index: u64,
    /// Offset of the first byte.
    pub start: u64,
    /// Number of bytes in the chunk.
    pub len: u64,
}

impl ChunkRange {
    /// Offset of the last byte (inclusive). Zero for an empty source.
    pub fn end(&self) -> u64 {
        (self.start + self.len).saturating_sub(1)
    }

    /// The `content-range` header value for this chunk.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end(), total)
    }
}

/// How a source of `total` bytes splits into chunks of `chunk_size`.
///
/// An empty source is still one (empty) chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(total: u64, chunk_size: u64) -> Self {
        Self {
            total,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Size of the whole source in bytes.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of chunks: `ceil(total / chunk_size)`, at least 1.
    pub fn chunk_count(&self) -> u64 {
        self.total.div_ceil(self.chunk_size).max(1)
    }

    /// The chunk at a 1-based index, if it exists.
    pub fn chunk(&self, index: u64) -> Option<ChunkRange> {
        if index == 0 || index > self.chunk_count() {
            return None;
        }
        let start = (index - 1) * self.chunk_size;
        let len = self.chunk_size.min(self.total - start);
        Some(ChunkRange { index, start, len })
    }

    /// All chunks in upload order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (1..=self.chunk_count()).filter_map(move |index| self.chunk(index))
    }
}

impl Client {
    /// Upload `file` as parameter `param_name`, chunk by chunk.
    ///
    /// `params` are sent with every chunk. Returns the response to the last
    /// chunk sent, or `ResponseBody::Json(null)` when a resumed upload had
    /// nothing left to send. The first failing chunk aborts the upload.
    #[allow(clippy::too_many_arguments)]
    #[instrument(
        skip(self, headers, params, file, options, on_progress),
        fields(method = method.as_str(), size = file.size(), filename = %file.filename())
    )]
    pub async fn chunked_upload(
        &self,
        method: RequestMethod,
        path: &str,
        headers: Headers,
        params: Params,
        param_name: &str,
        file: InputFile,
        options: UploadOptions,
        mut on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<ResponseBody> {
        let total = file.size();
        let plan = ChunkPlan::new(total, self.config().chunk_size as u64);
        let chunks_total = plan.chunk_count();
        let skipped = options.chunks_already_uploaded.min(chunks_total);
        let filename = file.filename().to_string();
        let mime_type = file.mime_type().map(str::to_string);

        if skipped == chunks_total {
            info!(chunks_total, "All chunks already uploaded");
            return Ok(ResponseBody::Json(serde_json::Value::Null));
        }

        info!(
            total_size = total,
            chunk_size = self.config().chunk_size,
            chunks_total,
            skipped,
            "Starting chunked upload"
        );

        let first = plan.chunk(skipped + 1).map(|c| c.start).unwrap_or(0);
        let mut reader = file.open(first).await?;
        let mut buffer = BytesMut::new();
        let mut resource_id = options.resource_id;
        let mut last = None;
        let mut sent = 0u64;

        let mut headers = headers;
        headers.insert("content-type", "multipart/form-data");

        for chunk in plan.chunks().skip(skipped as usize) {
            if options.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                return Err(Error::new(ErrorKind::Cancelled { chunks_sent: sent }));
            }

            let bytes = read_chunk(reader.as_mut(), &mut buffer, chunk.len).await?;
            if (bytes.len() as u64) < chunk.len {
                return Err(short_source(chunk.start + bytes.len() as u64, total));
            }

            let mut chunk_headers = headers.clone();
            if chunks_total > 1 {
                chunk_headers.insert(headers::CONTENT_RANGE, chunk.content_range(total));
            }
            if let Some(id) = &resource_id {
                chunk_headers.insert(headers::ID, id.clone());
            }

            let mut payload = FilePayload::new(bytes, filename.clone());
            payload.mime_type = mime_type.clone();
            let mut chunk_params = params.clone();
            chunk_params.insert(param_name, payload);

            debug!(
                chunk = chunk.index,
                start = chunk.start,
                len = chunk.len,
                "Uploading chunk"
            );

            let request = Request::new(method, path)
                .headers(chunk_headers)
                .params(chunk_params);
            let response = self.send(request).await?;
            sent += 1;

            if resource_id.is_none() {
                resource_id = response.id().map(str::to_string);
            }

            if let Some(callback) = on_progress.as_mut() {
                let size_uploaded = chunk.start + chunk.len;
                callback(UploadProgress {
                    id: resource_id.clone(),
                    progress: percent(size_uploaded, total),
                    size_uploaded,
                    chunks_total: response.u64_field("chunksTotal").unwrap_or(chunks_total),
                    chunks_uploaded: response.u64_field("chunksUploaded").unwrap_or(chunk.index),
                });
            }

            last = Some(response);
        }

        info!(chunks_sent = sent, "Chunked upload completed");
        Ok(last.unwrap_or(ResponseBody::Json(serde_json::Value::Null)))
    }
}

/// Fill the buffer with up to `len` bytes and hand them out.
///
/// The returned `Bytes` is exactly as long as what was read.
async fn read_chunk(
    reader: &mut (dyn AsyncRead + Send + Unpin),
    buffer: &mut BytesMut,
    len: u64,
) -> Result<Bytes> {
    buffer.clear();
    buffer.reserve(len as usize);

    while (buffer.len() as u64) < len {
        let remaining = len - buffer.len() as u64;
        let read = (&mut *reader).take(remaining).read_buf(buffer).await?;
        if read == 0 {
            break;
        }
    }

    Ok(buffer.split().freeze())
}

fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}
