pub mod delivery;
pub mod job;
pub mod metadata;
pub mod preview;
pub mod summary;
pub mod upload;

pub use delivery::{Attachment, DeliveryEnvelope, EPUB_CONTENT_TYPE};
pub use job::ConversionJob;
pub use metadata::{parse_metadata_field, BookMetadata};
pub use preview::PreviewDocument;
pub use summary::Summary;
pub use upload::{Upload, UploadKind};
