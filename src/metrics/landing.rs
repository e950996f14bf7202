//! HTML landing page served at `/`.

use super::server::ServerError;

/// A link shown on the landing page.
#[derive(Debug, Clone)]
pub struct LandingLink {
    /// Absolute path the link points to.
    pub address: String,
    /// Link text.
    pub text: String,
}

/// Landing page contents.
#[derive(Debug, Clone)]
pub struct LandingConfig {
    /// Page title and heading. Must not be blank.
    pub name: String,
    /// Short description below the heading.
    pub description: String,
    /// Version shown in the footer.
    pub version: String,
    /// Links listed on the page.
    pub links: Vec<LandingLink>,
}

/// Pre-rendered landing page.
#[derive(Debug, Clone)]
pub struct LandingPage {
    html: String,
}

impl LandingPage {
    /// Renders the page. Fails on an empty name or a relative link.
    pub fn new(config: &LandingConfig) -> Result<Self, ServerError> {
        if config.name.trim().is_empty() {
            return Err(ServerError::Landing("exporter name is empty".to_string()));
        }
        if let Some(link) = config.links.iter().find(|l| !l.address.starts_with('/')) {
            return Err(ServerError::Landing(format!(
                "link address {:?} must start with '/'",
                link.address
            )));
        }

        let links: String = config
            .links
            .iter()
            .map(|link| {
                format!(
                    "      <li><a href=\"{}\">{}</a></li>\n",
                    escape_html(&link.address),
                    escape_html(&link.text)
                )
            })
            .collect();

        let html = format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             \x20 <head>\n\
             \x20   <meta charset=\"UTF-8\">\n\
             \x20   <title>{name}</title>\n\
             \x20 </head>\n\
             \x20 <body>\n\
             \x20   <h1>{name}</h1>\n\
             \x20   <p>{description}</p>\n\
             \x20   <ul>\n\
             {links}\
             \x20   </ul>\n\
             \x20   <footer>version {version}</footer>\n\
             \x20 </body>\n\
             </html>\n",
            name = escape_html(&config.name),
            description = escape_html(&config.description),
            version = escape_html(&config.version),
            links = links,
        );

        Ok(Self { html })
    }

    /// Returns the rendered HTML.
    pub fn html(&self) -> &str {
        &self.html
    }
}

fn escape_html(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LandingConfig {
        LandingConfig {
            name: "SDTD Exporter".to_string(),
            description: "Prometheus exporter for 7 Days to Die".to_string(),
            version: "0.1.0".to_string(),
            links: vec![LandingLink {
                address: "/metrics".to_string(),
                text: "Metrics".to_string(),
            }],
        }
    }

    #[test]
    fn test_renders_links_and_version() {
        let page = LandingPage::new(&config()).unwrap();
        assert!(page.html().contains("<title>SDTD Exporter</title>"));
        assert!(page.html().contains("<a href=\"/metrics\">Metrics</a>"));
        assert!(page.html().contains("version 0.1.0"));
    }

    #[test]
    fn test_escapes_text() {
        let mut cfg = config();
        cfg.description = "<script>alert('x')</script>".to_string();
        let page = LandingPage::new(&cfg).unwrap();
        assert!(!page.html().contains("<script>"));
        assert!(page.html().contains("&lt;script&gt;"));
    }

    #[test]
    fn test_rejects_relative_link() {
        let mut cfg = config();
        cfg.links[0].address = "metrics".to_string();
        assert!(matches!(LandingPage::new(&cfg), Err(ServerError::Landing(_))));
    }

    #[test]
    fn test_rejects_empty_name() {
        for name in ["", "   "] {
            let mut cfg = config();
            cfg.name = name.to_string();
            assert!(matches!(LandingPage::new(&cfg), Err(ServerError::Landing(_))));
        }
    }
}
