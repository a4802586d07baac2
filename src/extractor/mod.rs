//! Operation extraction for AsyncAPI documents.
//!
//! 2.x and 3.x documents describe operations in very different places: 2.x nests
//! `publish` / `subscribe` under every channel, 3.x lists operations at the top level
//! and points them at channels. Each layout has its own extractor; both produce the
//! same normalized [`OperationInfo`] so rendering does not care about the version.
//!
//! # Example
//!
//! ```
//! use asyncapi_markdown::document::AsyncApiDocument;
//! use asyncapi_markdown::extractor::extractor_for;
//! use serde_json::json;
//!
//! let document = AsyncApiDocument::new(json!({
//!     "asyncapi": "2.6.0",
//!     "channels": { "light/measured": { "subscribe": { "message": { "payload": {} } } } }
//! }))
//! .unwrap();
//! let operations = extractor_for(document.version()).extract_operations(&document);
//! assert_eq!(operations[0].kind.label(), "SUB");
//! ```

pub mod v2;
pub mod v3;

use crate::detector::SpecVersion;
use crate::document::{AsyncApiDocument, Channel, Extensions, Message, Operation, ReplyAddress};
use crate::refs::{reference_name, reference_of};
use log::warn;
use serde_json::Value;

/// Trait for extracting operations from a loaded document.
///
/// Implementations know where one major version keeps its operations. Broken
/// operations are logged and skipped so the rest of the document still renders.
pub trait OperationExtractor {
    /// Extracts all operations in rendering order.
    fn extract_operations(&self, document: &AsyncApiDocument) -> Vec<OperationInfo>;
}

/// The extractor matching a document version.
pub fn extractor_for(version: SpecVersion) -> Box<dyn OperationExtractor> {
    match version {
        SpecVersion::V2 => Box::new(v2::V2Extractor),
        SpecVersion::V3 => Box::new(v3::V3Extractor),
    }
}

/// What an operation does from the point of view of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// 2.x `publish`
    Publish,
    /// 2.x `subscribe`
    Subscribe,
    /// 3.x `send` without a reply
    Send,
    /// 3.x `receive` without a reply
    Receive,
    /// 3.x `send` expecting a reply
    Request,
    /// 3.x `receive` answering with a reply
    Reply,
}

impl OperationKind {
    /// Label used in operation headers
    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Publish => "PUB",
            OperationKind::Subscribe => "SUB",
            OperationKind::Send => "SEND",
            OperationKind::Receive => "RECEIVE",
            OperationKind::Request => "REQUEST",
            OperationKind::Reply => "REPLY",
        }
    }

    /// Sentence introducing several messages of the operation.
    pub fn messages_preamble(self) -> &'static str {
        match self {
            OperationKind::Publish | OperationKind::Subscribe => {
                "Accepts **one of** the following messages:"
            }
            OperationKind::Send => "Sending **one of** the following messages:",
            OperationKind::Receive => "Receive **one of** the following messages:",
            OperationKind::Request | OperationKind::Reply => {
                "Request contains **one of** the following messages:"
            }
        }
    }
}

/// A message attached to an operation.
#[derive(Debug, Clone)]
pub struct MessageRef {
    /// Identifier shown in the message header; `None` for anonymous messages
    pub id: Option<String>,
    pub message: Message,
}

/// Reply side of a 3.x request/reply operation.
#[derive(Debug, Clone, Default)]
pub struct ReplyInfo {
    /// Address of the channel the reply is sent to
    pub channel_address: Option<String>,
    /// Runtime expression locating the reply address
    pub address: Option<ReplyAddress>,
    pub messages: Vec<MessageRef>,
    pub extensions: Extensions,
}

/// Everything needed to render one operation.
#[derive(Debug, Clone)]
pub struct OperationInfo {
    pub kind: OperationKind,
    /// Channel name (2.x) or address (3.x)
    pub channel_name: String,
    pub channel: Channel,
    pub operation: Operation,
    pub messages: Vec<MessageRef>,
    /// Servers the operation is restricted to; empty when available everywhere
    pub servers: Vec<String>,
    pub reply: Option<ReplyInfo>,
}

/// Resolves message values into [`MessageRef`]s, skipping broken ones.
///
/// The header id is the `messageId`, else the `name`, else the key the message was
/// referenced by.
pub(crate) fn message_refs<'a>(
    document: &AsyncApiDocument,
    values: impl IntoIterator<Item = (Option<&'a str>, &'a Value)>,
) -> Vec<MessageRef> {
    values
        .into_iter()
        .filter_map(|(key, value)| match document.message(value) {
            Ok(message) => {
                let id = message
                    .message_id
                    .clone()
                    .or_else(|| message.name.clone())
                    .or_else(|| reference_of(value).and_then(reference_name))
                    .or_else(|| key.map(str::to_string));
                Some(MessageRef { id, message })
            }
            Err(e) => {
                warn!("Skipping message: {}", e);
                None
            }
        })
        .collect()
}
