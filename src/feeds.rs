//! RSS 2.0 and sitemap rendering for published posts.

use crate::models::Post;

/// Number of posts included in the RSS feed.
pub const FEED_LIMIT: i64 = 20;

/// Site-level metadata used by the feed channel.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub site_url: String,
    pub site_title: String,
    pub description: String,
}

/// Escapes the five XML special characters.
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn post_url(site_url: &str, post: &Post) -> String {
    format!("{}/blog/{}", site_url.trim_end_matches('/'), post.slug)
}

/// render_rss
///
/// Items appear in the given order. `pubDate` falls back to `created_at` for
/// posts without a publication timestamp.
pub fn render_rss(settings: &FeedSettings, posts: &[Post]) -> String {
    let site_url = settings.site_url.trim_end_matches('/');
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n<channel>\n");
    xml.push_str(&format!("<title>{}</title>\n", xml_escape(&settings.site_title)));
    xml.push_str(&format!("<link>{}</link>\n", xml_escape(site_url)));
    xml.push_str(&format!(
        "<description>{}</description>\n",
        xml_escape(&settings.description)
    ));

    for post in posts {
        let url = xml_escape(&post_url(site_url, post));
        let published = post.published_at.unwrap_or(post.created_at);
        xml.push_str("<item>\n");
        xml.push_str(&format!("<title>{}</title>\n", xml_escape(&post.title)));
        xml.push_str(&format!("<link>{url}</link>\n"));
        xml.push_str(&format!("<guid isPermaLink=\"true\">{url}</guid>\n"));
        xml.push_str(&format!("<pubDate>{}</pubDate>\n", published.to_rfc2822()));
        if let Some(excerpt) = &post.excerpt {
            xml.push_str(&format!("<description>{}</description>\n", xml_escape(excerpt)));
        }
        for tag in &post.tags {
            xml.push_str(&format!("<category>{}</category>\n", xml_escape(tag)));
        }
        xml.push_str("</item>\n");
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

/// render_sitemap
///
/// Static pages first, then one entry per post with its last modification date.
pub fn render_sitemap(site_url: &str, static_paths: &[&str], posts: &[Post]) -> String {
    let site_url = site_url.trim_end_matches('/');
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for path in static_paths {
        xml.push_str(&format!(
            "<url><loc>{}</loc></url>\n",
            xml_escape(&format!("{site_url}{path}"))
        ));
    }

    for post in posts {
        xml.push_str(&format!(
            "<url><loc>{}</loc><lastmod>{}</lastmod></url>\n",
            xml_escape(&post_url(site_url, post)),
            post.updated_at.format("%Y-%m-%d")
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}
