//! Single-file multipart receiver
//!
//! Buffers the `file` field of a multipart/form-data request into memory. The
//! field is counted chunk by chunk so an oversized file is refused as soon as
//! it crosses the cap, without holding the whole body.

use super::errors::ApiError;
use axum::extract::multipart::{Multipart, MultipartRejection};
use bytes::{Bytes, BytesMut};
use tracing::debug;

/// Name of the form field carrying the file
pub const FILE_FIELD: &str = "file";

/// One uploaded file, alive only for the request that carried it
#[derive(Debug)]
pub struct UploadedFile {
    /// Filename as supplied by the client, used verbatim as the object key
    pub file_name: String,
    /// Declared content type of the part, forwarded unmodified
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Pull the first `file` part out of the request.
///
/// A request that is not multipart at all, or that has no `file` part with a
/// filename, counts as "no file uploaded". Other fields are skipped.
pub async fn receive_file(
    multipart: Result<Multipart, MultipartRejection>,
    max_size: u64,
) -> Result<UploadedFile, ApiError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            debug!("Not a multipart upload: {}", rejection);
            return Err(ApiError::NoFileUploaded);
        }
    };

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A `file` part without a filename is a plain text field, not a file
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = field.content_type().map(str::to_string);

        let mut buf = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::MalformedUpload(e.to_string()))?
        {
            if (buf.len() + chunk.len()) as u64 > max_size {
                return Err(ApiError::FileTooLarge { max: max_size });
            }
            buf.extend_from_slice(&chunk);
        }

        debug!(
            "Received upload {} ({} bytes, {:?})",
            file_name,
            buf.len(),
            content_type
        );
        return Ok(UploadedFile {
            file_name,
            content_type,
            data: buf.freeze(),
        });
    }

    Err(ApiError::NoFileUploaded)
}
