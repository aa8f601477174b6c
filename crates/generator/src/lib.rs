// HTML generation for the listing and detail pages.
//
// Templates are shared between the serve and build commands so what the
// local server shows is exactly what gets written to disk.

pub mod templates;

pub use templates::{
    IndexMode, IndexOptions, render_index, render_loading, render_not_found, render_post,
};

use blog_kit_core::types::PostData;
use chrono::{DateTime, Utc};

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Format a publication date for display
pub fn format_date(date: Option<&DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%b %d, %Y").to_string())
}

/// Estimated reading time in whole minutes, at 200 words per minute.
///
/// Always at least one minute, so even a stub post gets an honest label.
pub fn reading_time_minutes(data: &PostData) -> usize {
    let words = data.word_count();
    usize::max(1, words.div_ceil(200))
}

pub fn reading_time_label(data: &PostData) -> String {
    format!("{} min read", reading_time_minutes(data))
}

/// Client-side load-more script emitted next to the static listing page.
///
/// Mirrors the server-side listing state machine: fetches the literal
/// `next_page` URL, appends each fetched entry individually, allows a
/// single request in flight, hides the button once the last page reports
/// no successor, and surfaces failures as a retryable notice.
pub fn loadmore_js() -> String {
    r#"(function () {
  'use strict';

  var button = document.getElementById('load-more');
  var list = document.getElementById('posts');
  var errorNote = document.getElementById('load-error');
  if (!button || !list) return;

  var busy = false;

  function formatDate(value) {
    if (!value) return '';
    var date = new Date(value);
    if (isNaN(date)) return '';
    return date.toLocaleDateString(undefined, {
      year: 'numeric', month: 'short', day: 'numeric'
    });
  }

  function line(tag, className, text) {
    var node = document.createElement(tag);
    if (className) node.className = className;
    node.textContent = text;
    return node;
  }

  function appendPost(doc) {
    var uid = doc.uid || '';
    var data = doc.data || {};

    var section = document.createElement('section');
    section.className = 'post-summary';

    var heading = document.createElement('h2');
    var link = document.createElement('a');
    link.href = '/post/' + encodeURIComponent(uid) + '/';
    link.textContent = data.title || '';
    heading.appendChild(link);
    section.appendChild(heading);

    section.appendChild(line('p', 'subtitle', data.subtitle || ''));

    var footer = document.createElement('footer');
    footer.appendChild(line('time', null, formatDate(doc.first_publication_date)));
    footer.appendChild(line('span', 'author', data.author || ''));
    section.appendChild(footer);

    list.appendChild(section);
  }

  button.addEventListener('click', function () {
    if (busy) return; // one request in flight at a time
    var next = button.dataset.nextPage;
    if (!next) return;
    busy = true;

    fetch(next)
      .then(function (response) {
        if (!response.ok) throw new Error('status ' + response.status);
        return response.json();
      })
      .then(function (page) {
        (page.results || []).forEach(appendPost);
        if (page.next_page) {
          button.dataset.nextPage = page.next_page;
        } else {
          delete button.dataset.nextPage;
          button.hidden = true;
        }
        if (errorNote) errorNote.hidden = true;
      })
      .catch(function () {
        if (errorNote) errorNote.hidden = false;
      })
      .finally(function () {
        busy = false;
      });
  });
})();
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_kit_core::types::{Banner, ContentBlock, TextSpan};
    use chrono::TimeZone;

    fn post_data(words_in_body: usize) -> PostData {
        let text = vec!["word"; words_in_body].join(" ");
        PostData {
            title: String::new(),
            subtitle: String::new(),
            author: String::new(),
            banner: Banner::default(),
            content: vec![ContentBlock {
                heading: String::new(),
                body: vec![TextSpan { text }],
            }],
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("Hello World"), "Hello World");
        assert_eq!(html_escape("Test & Test"), "Test &amp; Test");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(html_escape("'single'"), "&#x27;single&#x27;");
    }

    #[test]
    fn test_html_escape_xss_attempts() {
        assert_eq!(
            html_escape("<script>alert('XSS')</script>"),
            "&lt;script&gt;alert(&#x27;XSS&#x27;)&lt;/script&gt;"
        );
        assert_eq!(
            html_escape("<img src=x onerror=alert(1)>"),
            "&lt;img src=x onerror=alert(1)&gt;"
        );
    }

    #[test]
    fn test_html_escape_unicode_passes_through() {
        assert_eq!(html_escape("viagem espacial"), "viagem espacial");
        assert_eq!(html_escape("宇宙旅行"), "宇宙旅行");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap();
        assert_eq!(format_date(Some(&date)).as_deref(), Some("Mar 15, 2021"));
        assert_eq!(format_date(None), None);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(&post_data(1)), 1);
        assert_eq!(reading_time_minutes(&post_data(200)), 1);
        assert_eq!(reading_time_minutes(&post_data(201)), 2);
        assert_eq!(reading_time_minutes(&post_data(999)), 5);
    }

    #[test]
    fn test_reading_time_minimum_one_minute() {
        assert_eq!(reading_time_minutes(&post_data(0)), 1);
        assert_eq!(reading_time_label(&post_data(0)), "1 min read");
    }

    #[test]
    fn test_loadmore_js_keeps_pagination_contract() {
        let js = loadmore_js();
        // Fetches the literal next_page URL and flattens results
        assert!(js.contains("dataset.nextPage"));
        assert!(js.contains("(page.results || []).forEach(appendPost)"));
        // One request in flight at a time
        assert!(js.contains("if (busy) return"));
        // Button hidden once the last page has no successor
        assert!(js.contains("button.hidden = true"));
    }
}
