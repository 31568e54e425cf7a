//! Markup projection of the view model.
//!
//! Every string that can originate outside this process (message text, file
//! names, key names, addresses) goes through [`codec::escape_html`], both in
//! element content and in attribute values.

use std::fmt;

use asemic_proto::codec::escape_html;

use super::{FeedView, MessageBody, MessageView, TrafficView, ViewModel, NOISE_LABEL};

/// [`fmt::Display`] adapter writing a [`ViewModel`] as HTML.
#[derive(Debug, Clone, Copy)]
pub struct Html<'a>(&'a ViewModel);

impl ViewModel {
    /// Markup adapter for this view.
    pub fn html(&self) -> Html<'_> {
        Html(self)
    }

    /// Render this view as an HTML fragment.
    pub fn to_html(&self) -> String {
        self.html().to_string()
    }
}

impl fmt::Display for Html<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        write!(
            f,
            r#"<div id="ws-status" class="{}">{}</div>"#,
            view.status.class.css(),
            escape_html(view.status.text)
        )?;

        f.write_str(r#"<ul id="key-list">"#)?;
        if let Some(placeholder) = view.keys.placeholder {
            write!(f, r#"<li class="no-keys">{}</li>"#, escape_html(placeholder))?;
        }
        for entry in &view.keys.entries {
            let name = escape_html(&entry.name);
            let class = if entry.selected { r#" class="selected""# } else { "" };
            write!(
                f,
                r#"<li{class}>{name}<button class="delete-key" data-key="{name}" title="Remove key {name}">✖</button></li>"#
            )?;
        }
        f.write_str("</ul>")?;
        write!(f, r#"<span id="current-key">{}</span>"#, escape_html(&view.compose.current_key))?;

        write_feed(f, "message-feed", &view.messages, write_message)?;
        write_feed(f, "traffic-feed", &view.traffic, write_traffic)?;

        write!(
            f,
            r#"<dl id="stats"><dt>Sent</dt><dd id="stat-sent">{}</dd><dt>Noise sent</dt><dd id="stat-noise-sent">{}</dd><dt>Received</dt><dd id="stat-received">{}</dd><dt>Decrypted</dt><dd id="stat-decrypted">{}</dd></dl>"#,
            view.stats.packets_sent,
            view.stats.noise_packets_sent,
            view.stats.packets_received,
            view.stats.messages_decrypted,
        )?;

        if let Some(label) = &view.compose.file_label {
            write!(f, r#"<span id="file-name-display">{}</span>"#, escape_html(label))?;
        }
        if let Some(alert) = &view.alert {
            write!(f, r#"<div class="alert" role="alert">{}</div>"#, escape_html(alert))?;
        }
        Ok(())
    }
}

fn write_feed<T>(
    f: &mut fmt::Formatter<'_>,
    id: &str,
    feed: &FeedView<T>,
    item: fn(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    write!(f, r#"<div id="{id}">"#)?;
    if let Some(placeholder) = feed.placeholder {
        write!(f, r#"<div class="feed-placeholder">{}</div>"#, escape_html(placeholder))?;
    }
    for entry in &feed.items {
        item(f, entry)?;
    }
    f.write_str("</div>")
}

fn write_message(f: &mut fmt::Formatter<'_>, message: &MessageView) -> fmt::Result {
    write!(
        f,
        r#"<div class="feed-item message"><div class="message-meta"><span class="timestamp">[{}]</span> From <span class="message-sender">{}</span> (key: <span class="key-used">{}</span>, pattern: <span class="pattern-used">{}</span>)</div>"#,
        message.time,
        escape_html(&message.sender),
        escape_html(&message.key),
        message.pattern,
    )?;
    match &message.body {
        MessageBody::Text(text) => {
            write!(f, r#"<div class="message-content">{}</div>"#, escape_html(text))?;
        },
        MessageBody::File { filename, href } => {
            write!(
                f,
                r#"<div class="message-content file-attachment">📎 File: <strong>{}</strong>"#,
                escape_html(filename)
            )?;
            if let Some(href) = href {
                write!(f, r#" <a href="{}" class="download-link">Download</a>"#, escape_html(href))?;
            }
            f.write_str("</div>")?;
        },
    }
    f.write_str("</div>")
}

fn write_traffic(f: &mut fmt::Formatter<'_>, record: &TrafficView) -> fmt::Result {
    write!(
        f,
        r#"<div class="feed-item noise"><span class="timestamp">[{}]</span> RECV from {} | {} bytes | <span class="noise-label">{NOISE_LABEL}</span></div>"#,
        record.time,
        escape_html(&record.sender),
        record.size,
    )
}
