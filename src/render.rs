use crate::config::Config;
use crate::metadata::MetadataStore;
use crate::models::ScreenshotRecord;
use crate::upload::HASH_LEN;
use chrono::{DateTime, Datelike, Utc};

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Split records into rows of `columns`.
/// Unless `keep_partial` is set, a trailing row with fewer entries is left out.
pub fn group_records(
    records: &[ScreenshotRecord],
    columns: usize,
    keep_partial: bool,
) -> Vec<&[ScreenshotRecord]> {
    let columns = columns.max(1);
    if keep_partial {
        records.chunks(columns).collect()
    } else {
        records.chunks_exact(columns).collect()
    }
}

/// One grid row of the listing page
pub fn render_group(config: &Config, group: &[ScreenshotRecord]) -> String {
    let mut html = String::from("<div class=\"parent\">");

    for record in group {
        let title = escape_html(&record.title);
        let hash = escape_html(&record.hash);
        let file_name = escape_html(&record.file_name);
        let url = escape_html(&config.public_url(&record.hash));

        html.push_str(&format!(
            concat!(
                "<div class=\"column\"><div><p class=\"text\">{title}</p>",
                "<div class=\"image-buttons\">",
                "<p class=\"edit\" data-hash=\"{hash}\" data-file=\"{file_name}\" data-title=\"{title}\" onclick=\"editImage(this)\">E</p>",
                "<p class=\"delete\" data-hash=\"{hash}\" onclick=\"deleteImage(this)\">X</p>",
                "</div></div>",
                "<img class=\"image\" data-url=\"{url}\" onclick=\"copyToClipboard(this)\" src=\"{file_name}\" /></div>"
            ),
            title = title,
            hash = hash,
            file_name = file_name,
            url = url,
        ));
    }

    html.push_str("</div>\n");
    html
}

/// Rendered rows, newest screenshots first
pub fn render_listing(config: &Config, records: &[ScreenshotRecord]) -> Vec<String> {
    group_records(
        records,
        config.listing_columns,
        config.listing_show_partial_row,
    )
    .into_iter()
    .map(|group| render_group(config, group))
    .collect()
}

pub fn render_listing_page(fragments: &[String]) -> String {
    let mut html = String::from(LISTING_HEAD);
    for fragment in fragments {
        html.push_str(fragment);
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Look up a slug, falling back to the not-found record.
/// Slugs of the wrong length never reach the store.
pub async fn resolve_screenshot(store: &dyn MetadataStore, slug: &str) -> ScreenshotRecord {
    if slug.len() != HASH_LEN {
        return ScreenshotRecord::not_found();
    }

    match store.find_by_hash(slug).await {
        Ok(Some(record)) => record,
        Ok(None) => ScreenshotRecord::not_found(),
        Err(e) => {
            tracing::error!("Failed to look up screenshot {}: {}", slug, e);
            ScreenshotRecord::not_found()
        }
    }
}

/// e.g. `March 4th, 2024 at 09:05:01 pm`
pub fn format_upload_date(uploaded_at: DateTime<Utc>) -> String {
    format!(
        "{} {}{}, {} at {}",
        uploaded_at.format("%B"),
        uploaded_at.day(),
        ordinal_suffix(uploaded_at.day()),
        uploaded_at.year(),
        uploaded_at.format("%I:%M:%S %P")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

pub fn render_detail_page(config: &Config, record: &ScreenshotRecord) -> String {
    let title = escape_html(&record.title);
    let image_url = escape_html(&config.public_url(&record.file_name));
    let file_name = escape_html(&record.file_name);

    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("\t<meta charset=\"UTF-8\">\n");
    html.push_str(
        "\t<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    if !record.title.is_empty() {
        html.push_str(&format!("\t<title>{}</title>\n", title));
        html.push_str(&format!(
            "\t<meta property=\"og:title\" content=\"{}\"/>\n",
            title
        ));
        html.push_str(&format!(
            "\t<meta name=\"twitter:title\" content=\"{}\"/>\n",
            title
        ));
    }
    html.push_str(&format!(
        "\t<meta property=\"og:image\" content=\"{}\"/>\n",
        image_url
    ));
    html.push_str(&format!(
        "\t<meta name=\"twitter:image\" content=\"{}\"/>\n",
        image_url
    ));
    html.push_str("\t<meta name=\"twitter:card\" content=\"summary_large_image\"/>\n");
    html.push_str(DETAIL_STYLE);
    html.push_str("</head>\n<body>\n<div class=\"jumbotron\">\n<div class=\"container\">\n");

    if !record.title.is_empty() {
        html.push_str(&format!("<h1>{}</h1>\n", title));
    }
    html.push_str(&format!("<p><img src=\"{}\"></p>\n", file_name));
    html.push_str(&format!(
        "<h4>Date: {}</h4>\n",
        format_upload_date(record.uploaded_at)
    ));
    html.push_str(&format!(
        "<h4>Dimensions: {} x {}px</h4>\n",
        record.width, record.height
    ));
    html.push_str(&format!(
        "<h4>File Type: {}</h4>\n",
        escape_html(&record.file_type)
    ));
    html.push_str(&format!(
        "<h4>File Size: {}</h4>\n",
        escape_html(&record.size_label)
    ));
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

const DETAIL_STYLE: &str = r#"	<link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css">
	<style>
		.jumbotron { text-align: center; }
		.jumbotron h1, .jumbotron p { margin-top: 20px; margin-bottom: 20px; }
		.jumbotron img { max-width: 100%; }
	</style>
"#;

const LISTING_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/4.0.0/css/bootstrap.min.css">
    <script src="https://code.jquery.com/jquery-3.2.1.slim.min.js"></script>
    <script src="https://maxcdn.bootstrapcdn.com/bootstrap/4.0.0/js/bootstrap.min.js"></script>
    <script>
        function password() {
            return new URL(window.location.href).searchParams.get("p");
        }

        function copyToClipboard(element) {
            navigator.clipboard.writeText(element.dataset.url);
        }

        function editImage(element) {
            document.getElementById("editModalImage").src = element.dataset.file;
            document.getElementById("editModalHash").value = element.dataset.hash;
            document.getElementById("editModalNewTitle").value = element.dataset.title;
            $('#editModal').modal('show');
        }

        function sendEdit(method, payload) {
            var xhr = new XMLHttpRequest();
            payload.p = password();
            xhr.open(method, "./api", true);
            xhr.setRequestHeader("Content-Type", "application/json");
            xhr.onload = function() {
                window.location.reload();
            };
            xhr.send(JSON.stringify(payload));
        }

        function updateImageTitle() {
            sendEdit("POST", {
                hash: document.getElementById("editModalHash").value,
                title: document.getElementById("editModalNewTitle").value
            });
        }

        function deleteImage(element) {
            sendEdit("DELETE", { hash: element.dataset.hash });
        }
    </script>
    <style>
        .parent { width: 100%; display: flow-root; }
        .column { background: grey; float: left; width: 23%; padding: 1%; margin: 1%; }
        .image { width: 100%; cursor: pointer; }
        .text { display: inline-block; width: 80%; word-break: break-all; hyphens: auto; }
        .image-buttons { float: right; cursor: pointer; }
        .input-fill { width: 100%; }
    </style>
</head>
<body>
<div class="modal fade" id="editModal" tabindex="-1" role="dialog" aria-hidden="true">
    <div class="modal-dialog modal-dialog-centered" role="document">
        <div class="modal-content">
            <div class="modal-header">
                <h5 class="modal-title">Edit Image</h5>
                <button type="button" class="close" data-dismiss="modal" aria-label="Close">
                    <span aria-hidden="true">&times;</span>
                </button>
            </div>
            <div class="modal-body">
                <div><img id="editModalImage" style="max-width: 100%"/></div>
                <div><label for="editModalHash">Hash: </label><input class="input-fill" type="text" id="editModalHash" readonly></div>
                <div><label for="editModalNewTitle">New Title: </label><input class="input-fill" type="text" id="editModalNewTitle"></div>
            </div>
            <div class="modal-footer">
                <button type="button" class="btn btn-secondary" data-dismiss="modal">Close</button>
                <button type="button" class="btn btn-primary" onclick="updateImageTitle();">Save changes</button>
            </div>
        </div>
    </div>
</div>
"#;
