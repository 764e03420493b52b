//! Attachment field values.

use serde::Serialize;

crate::fields! {
    /// A thumbnail generated by the service for an image attachment.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Thumbnail {
        #[wire("url")]
        pub url: String,
        #[wire("width")]
        pub width: f64,
        #[wire("height")]
        pub height: f64,
    }
}

crate::fields! {
    /// Small and large thumbnails of an attachment.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Thumbnails {
        #[wire("small")]
        pub small: Thumbnail,
        #[wire("large")]
        pub large: Thumbnail,
    }
}

crate::fields! {
    /// A file attached to a record.
    ///
    /// To attach a new file only `url` (and optionally `filename`) needs to be
    /// set; the service fills in the rest when the record is written.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Attachment {
        #[wire("id")]
        pub id: String,
        #[wire("url")]
        pub url: String,
        #[wire("filename")]
        pub filename: String,
        #[wire("size")]
        pub size: f64,
        #[wire("type")]
        pub mime_type: String,
        #[wire("thumbnails")]
        pub thumbnails: Thumbnails,
    }
}

impl Attachment {
    /// A new attachment to be uploaded from `url`.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Builder-style method to set the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// The subset of the attachment the service accepts on writes.
    pub(crate) fn write_form(&self) -> AttachmentWrite<'_> {
        AttachmentWrite {
            id: non_empty(&self.id),
            url: &self.url,
            filename: non_empty(&self.filename),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// Attachment as sent in a create or update body.
#[derive(Debug, Serialize)]
pub(crate) struct AttachmentWrite<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}
