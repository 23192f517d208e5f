//! Kindlezap Services Library
//!
//! Outbound integrations: the hosted language model used for summaries and the SMTP relay
//! used for delivery. Both sit behind traits so request handling can be tested without
//! network access.

pub mod mailer;
pub mod summarizer;

pub use mailer::{build_message, parse_mailbox, DeliveryError, Mailer, SmtpMailer};
pub use summarizer::{OpenAiSummarizer, Summarizer, FALLBACK_SUMMARY};
