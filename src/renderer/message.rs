use super::info::{external_docs_link, media_type_link};
use super::{end_block, DocumentRenderer};
use crate::document::{schema_of, CorrelationId, Message, MessageExample};
use crate::extractor::MessageRef;
use crate::markdown::{block_quote, code_block, header, indent, inline_code, list_item, paragraph};
use crate::sampler;
use crate::schema::{SchemaId, SchemaTableOptions};
use serde_json::Value;

/// Which part of a message a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessagePart {
    Headers,
    Payload,
}

impl MessagePart {
    fn title(self) -> &'static str {
        match self {
            MessagePart::Headers => "Headers",
            MessagePart::Payload => "Payload",
        }
    }

    fn key(self) -> &'static str {
        match self {
            MessagePart::Headers => "headers",
            MessagePart::Payload => "payload",
        }
    }

    fn of(self, example: &MessageExample) -> Option<&Value> {
        match self {
            MessagePart::Headers => example.headers.as_ref(),
            MessagePart::Payload => example.payload.as_ref(),
        }
    }
}

struct Example<'a> {
    name: Option<&'a str>,
    summary: Option<&'a str>,
    value: &'a Value,
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn render_examples(examples: &[Example<'_>]) -> String {
    let mut out = String::new();
    for example in examples {
        if let Some(name) = example.name.filter(|name| !name.is_empty()) {
            out.push_str(&paragraph(&format!("_{}_", name)));
        }
        if let Some(summary) = example.summary {
            out.push_str(&paragraph(summary));
        }
        out.push_str(&code_block("json", &pretty_json(example.value)));
        out.push('\n');
    }
    out
}

impl DocumentRenderer<'_> {
    pub(super) fn render_message(&mut self, message_ref: &MessageRef) -> String {
        let message = &message_ref.message;

        let mut title = String::from("Message");
        if let Some(message_title) = message.title.as_deref().filter(|t| !t.is_empty()) {
            title.push(' ');
            title.push_str(message_title);
        }
        let id = match &message_ref.id {
            Some(id) => id.clone(),
            None => self.next_anonymous_message(),
        };
        title.push(' ');
        title.push_str(&inline_code(&id));
        let mut out = header(4, &title);

        if let Some(summary) = message.summary.as_deref().map(str::trim) {
            if !summary.is_empty() {
                out.push_str(&paragraph(&format!("*{}*", summary)));
            }
        }

        out.push_str(&self.render_message_facts(message));

        if let Some(description) = &message.description {
            out.push_str(&paragraph(description));
        }
        if let Some(docs) = self.document.external_docs_of(message.external_docs.as_ref()) {
            out.push_str(&paragraph(&external_docs_link(&docs)));
        }

        if let Some(headers) = &message.headers {
            out.push_str(&self.render_message_part(message, MessagePart::Headers, headers));
        }
        if let Some(payload) = &message.payload {
            out.push_str(&self.render_message_part(message, MessagePart::Payload, payload));
        }

        out.push_str(&self.render_bindings("Message specific information", message.bindings.as_ref()));
        out.push_str(&self.render_extensions("Message extensions", &message.extensions));
        out.push_str(&self.render_tags("Message tags", &message.tags));
        out
    }

    /// Message ID, content type and correlation ID list.
    fn render_message_facts(&self, message: &Message) -> String {
        let mut out = String::new();
        if let Some(id) = message.message_id.as_deref().filter(|id| !id.is_empty()) {
            out.push_str(&list_item(&format!("Message ID: {}", inline_code(id))));
        }

        let content_type = message
            .content_type
            .as_deref()
            .or_else(|| self.document.default_content_type())
            .filter(|content_type| !content_type.is_empty());
        if let Some(content_type) = content_type {
            out.push_str(&list_item(&format!(
                "Content type: {}",
                media_type_link(content_type)
            )));
        }

        let correlation_id = message
            .correlation_id
            .as_ref()
            .and_then(|value| self.document.view_or_warn::<CorrelationId>(value, "correlation ID"));
        if let Some(correlation_id) = correlation_id {
            out.push_str(&list_item(&format!(
                "Correlation ID: {}",
                inline_code(&correlation_id.location)
            )));
            if let Some(description) = correlation_id
                .description
                .as_deref()
                .filter(|description| !description.is_empty())
            {
                out.push('\n');
                out.push_str(&indent(description.trim_end(), 2));
                out.push('\n');
            }
        }

        end_block(&mut out);
        out
    }

    fn render_message_part(&mut self, message: &Message, part: MessagePart, schema: &Value) -> String {
        let id = self.builder().build(schema_of(schema));

        let mut out = header(5, part.title());
        out.push_str(&self.table_for(id, &SchemaTableOptions::untitled()));
        out.push_str(&self.render_part_examples(message, part, id));
        out
    }

    /// Examples of a message part: the message's own examples, else the
    /// schema's `examples`, else a generated one.
    fn render_part_examples(&self, message: &Message, part: MessagePart, id: SchemaId) -> String {
        let explicit: Vec<Example<'_>> = message
            .examples
            .iter()
            .filter_map(|example| {
                Some(Example {
                    name: example.name.as_deref(),
                    summary: example.summary.as_deref(),
                    value: part.of(example)?,
                })
            })
            .collect();
        if !explicit.is_empty() {
            let mut out = block_quote(&format!("Examples of {}", part.key()));
            out.push_str(&render_examples(&explicit));
            return out;
        }

        let schema_examples: Vec<Example<'_>> = self
            .arena
            .object(id)
            .and_then(|schema| schema.examples.as_deref())
            .unwrap_or_default()
            .iter()
            .map(|value| Example {
                name: None,
                summary: None,
                value,
            })
            .collect();
        if !schema_examples.is_empty() {
            let mut out = block_quote(&format!("Examples of {}", part.key()));
            out.push_str(&render_examples(&schema_examples));
            return out;
        }

        let generated = sampler::sample(&self.arena, id);
        let mut out = block_quote(&format!("Examples of {} _(generated)_", part.key()));
        out.push_str(&code_block("json", &pretty_json(&generated)));
        out.push('\n');
        out
    }
}
