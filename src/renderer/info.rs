use super::{end_block, DocumentRenderer};
use crate::document::{display_value, ExternalDocs};
use crate::error::Result;
use crate::markdown::{header, image, inline_code, link, list_item, paragraph};

/// Link text used when external docs carry no description.
pub(crate) const DEFAULT_DOCS_TEXT: &str = "Find more info here.";

/// IANA registry page of a media type
pub(crate) fn media_type_link(content_type: &str) -> String {
    link(
        content_type,
        &format!("https://www.iana.org/assignments/media-types/{}", content_type),
    )
}

/// External docs as a paragraph-sized link.
pub(crate) fn external_docs_link(docs: &ExternalDocs) -> String {
    let text = docs
        .description
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_DOCS_TEXT);
    link(text, &docs.url)
}

impl DocumentRenderer<'_> {
    pub(super) fn render_info(&self) -> Result<String> {
        let info = self.document.info()?;
        let mut out = header(1, &format!("{} {} documentation", info.title, info.version));

        let mut facts = String::new();
        if let Some(id) = self.document.id() {
            facts.push_str(&list_item(&format!("Specification ID: {}", inline_code(id))));
        }
        if let Some(license) = info.license.as_ref().filter(|license| !license.name.is_empty()) {
            let text = match &license.url {
                Some(url) => link(&license.name, url),
                None => license.name.clone(),
            };
            facts.push_str(&list_item(&format!("License: {}", text)));
        }
        if let Some(terms) = &info.terms_of_service {
            facts.push_str(&list_item(&format!("Terms of service: {}", link(terms, terms))));
        }
        if let Some(content_type) = self.document.default_content_type() {
            facts.push_str(&list_item(&format!(
                "Default content type: {}",
                media_type_link(content_type)
            )));
        }
        if let Some(contact) = &info.contact {
            if let Some(url) = &contact.url {
                let name = contact.name.as_deref().unwrap_or(url);
                facts.push_str(&list_item(&format!("Support: {}", link(name, url))));
            }
            if let Some(email) = &contact.email {
                facts.push_str(&list_item(&format!(
                    "Email support: {}",
                    link(email, &format!("mailto:{}", email))
                )));
            }
        }
        out.push_str(&facts);
        end_block(&mut out);

        if let Some(docs) = self.document.external_docs() {
            out.push_str(&paragraph(&external_docs_link(&docs)));
        }
        if let Some(description) = &info.description {
            out.push_str(&paragraph(description));
        }
        if let Some(logo) = info.extensions.get("x-logo") {
            let alt = format!("{} logo", info.title);
            out.push_str(&paragraph(&image(&alt, &display_value(logo))));
        }

        let tags = self.document.tags();
        if !tags.is_empty() {
            out.push_str(&header(6, "Specification tags"));
            out.push_str(&self.render_tag_list(&tags));
        }

        Ok(out)
    }
}
