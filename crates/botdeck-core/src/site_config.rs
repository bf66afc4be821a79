//! Virtual host extraction from nginx and apache2 configuration text.
//!
//! Both parsers are pure: they look at one file's text and return the site's
//! domain and document root, or `None` when the file does not describe an
//! actionable site. Existence of the document root is checked by the catalog.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::types::{ContentKind, WebServerKind};

/// Domain and document root pulled out of one configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSite {
    pub domain: String,
    pub document_root: PathBuf,
}

/// Parse `text` with the dialect of `server`.
pub fn parse(server: WebServerKind, text: &str, file_name: &str) -> Option<ParsedSite> {
    match server {
        WebServerKind::Nginx => parse_nginx(text),
        WebServerKind::Apache2 => parse_apache(text, file_name),
    }
}

// ---------------------------------------------------------------------------
// nginx
// ---------------------------------------------------------------------------

static NGINX_ROOT_RE: OnceLock<Regex> = OnceLock::new();
static NGINX_SERVER_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn nginx_root_re() -> &'static Regex {
    NGINX_ROOT_RE.get_or_init(|| Regex::new(r"(?m)^\s*root\s+([^\s;]+);").unwrap())
}

fn nginx_server_name_re() -> &'static Regex {
    NGINX_SERVER_NAME_RE.get_or_init(|| Regex::new(r"(?m)^\s*server_name\s+([^;]+);").unwrap())
}

/// Needs both `root` and `server_name`; the first of each wins. A file whose
/// `server_name` has no usable host (only `_`, `localhost`, bare IPs) is
/// dropped even when its root is fine.
pub fn parse_nginx(text: &str) -> Option<ParsedSite> {
    let root = nginx_root_re().captures(text)?.get(1)?.as_str();
    let names = nginx_server_name_re().captures(text)?.get(1)?.as_str();

    let domain = names
        .split_whitespace()
        .find(|name| is_host_name(name) && !is_numeric_host(name))?;

    Some(ParsedSite {
        domain: domain.to_string(),
        document_root: PathBuf::from(strip_quotes(root)),
    })
}

// ---------------------------------------------------------------------------
// apache2
// ---------------------------------------------------------------------------

static APACHE_DOCROOT_RE: OnceLock<Regex> = OnceLock::new();
static APACHE_SERVER_NAME_RE: OnceLock<Regex> = OnceLock::new();
static APACHE_ALIAS_RE: OnceLock<Regex> = OnceLock::new();

fn apache_docroot_re() -> &'static Regex {
    APACHE_DOCROOT_RE.get_or_init(|| Regex::new(r"(?m)^\s*DocumentRoot\s+([^\s#]+)").unwrap())
}

fn apache_server_name_re() -> &'static Regex {
    APACHE_SERVER_NAME_RE.get_or_init(|| Regex::new(r"(?m)^\s*ServerName\s+([^\s#]+)").unwrap())
}

fn apache_alias_re() -> &'static Regex {
    APACHE_ALIAS_RE.get_or_init(|| Regex::new(r"(?m)^\s*ServerAlias\s+(.+)$").unwrap())
}

/// Needs `DocumentRoot`. The domain falls back from `ServerName` to the first
/// usable token of the first `ServerAlias` line, and finally to the file name,
/// so an apache2 site is never dropped for lack of a host name.
pub fn parse_apache(text: &str, file_name: &str) -> Option<ParsedSite> {
    let root = apache_docroot_re().captures(text)?.get(1)?.as_str();

    let server_name = apache_server_name_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("localhost"));

    let alias = || {
        apache_alias_re()
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().split_whitespace().find(|name| is_host_name(name)))
    };

    let domain = server_name.or_else(alias).unwrap_or(file_name);

    Some(ParsedSite {
        domain: domain.to_string(),
        document_root: PathBuf::from(strip_quotes(root)),
    })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Dotted, not the `_` catch-all, not `localhost`.
fn is_host_name(name: &str) -> bool {
    name.contains('.') && name != "_" && !name.eq_ignore_ascii_case("localhost")
}

/// Digits and dots only, e.g. `127.0.0.1`.
fn is_numeric_host(name: &str) -> bool {
    let digits: Vec<char> = name.chars().filter(|c| *c != '.').collect();
    !digits.is_empty() && digits.iter().all(|c| c.is_ascii_digit())
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '\'' || c == '"')
}

/// PHP when `index.php` sits directly under the document root.
pub fn content_kind(document_root: &Path) -> ContentKind {
    if document_root.join("index.php").is_file() {
        ContentKind::Php
    } else {
        ContentKind::Html
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nginx_picks_first_acceptable_server_name() {
        let text = "server {\n    listen 80;\n    server_name site1.example.com www.site1.example.com;\n    root /var/www/site1;\n}\n";
        let site = parse_nginx(text).unwrap();
        assert_eq!(site.domain, "site1.example.com");
        assert_eq!(site.document_root, PathBuf::from("/var/www/site1"));
    }

    #[test]
    fn nginx_skips_unusable_tokens() {
        let text = "server_name _ localhost 10.0.0.1 LOCALHOST shop.example.org;\nroot \"/srv/shop\";\n";
        let site = parse_nginx(text).unwrap();
        assert_eq!(site.domain, "shop.example.org");
        assert_eq!(site.document_root, PathBuf::from("/srv/shop"));
    }

    #[test]
    fn nginx_catch_all_only_is_dropped() {
        assert!(parse_nginx("server_name _;\nroot /var/www/html;\n").is_none());
        assert!(parse_nginx("server_name localhost 127.0.0.1;\nroot /var/www/html;\n").is_none());
    }

    #[test]
    fn nginx_requires_both_directives() {
        assert!(parse_nginx("root /var/www/x;\n").is_none());
        assert!(parse_nginx("server_name x.example.com;\n").is_none());
    }

    #[test]
    fn nginx_ignores_commented_and_inline_directives() {
        let text = "# root /wrong;\nserver_name a.example.com;\n  root /right;\n";
        let site = parse_nginx(text).unwrap();
        assert_eq!(site.document_root, PathBuf::from("/right"));
    }

    #[test]
    fn apache_prefers_server_name() {
        let text = "<VirtualHost *:80>\n  ServerName blog.example.com\n  ServerAlias www.blog.example.com\n  DocumentRoot /var/www/blog\n</VirtualHost>\n";
        let site = parse_apache(text, "blog.conf").unwrap();
        assert_eq!(site.domain, "blog.example.com");
        assert_eq!(site.document_root, PathBuf::from("/var/www/blog"));
    }

    #[test]
    fn apache_falls_back_to_first_alias_line() {
        let text = "ServerName localhost\nServerAlias _ localhost www.shop.test\nServerAlias other.test\nDocumentRoot /var/www/shop\n";
        let site = parse_apache(text, "shop.conf").unwrap();
        assert_eq!(site.domain, "www.shop.test");
    }

    #[test]
    fn apache_falls_back_to_file_name() {
        let site = parse_apache("DocumentRoot /var/www/x\n", "000-default.conf").unwrap();
        assert_eq!(site.domain, "000-default.conf");
        assert_eq!(site.document_root, PathBuf::from("/var/www/x"));
    }

    #[test]
    fn apache_alias_accepts_numeric_hosts() {
        let text = "ServerAlias 192.168.1.10\nDocumentRoot /srv/ip\n";
        assert_eq!(parse_apache(text, "ip.conf").unwrap().domain, "192.168.1.10");
    }

    #[test]
    fn apache_requires_document_root() {
        assert!(parse_apache("ServerName a.example.com\n", "a.conf").is_none());
    }

    #[test]
    fn apache_strips_quotes_and_comments() {
        let text = "DocumentRoot \"/var/www/q\"# trailing\n";
        let site = parse_apache(text, "q.conf").unwrap();
        assert_eq!(site.document_root, PathBuf::from("/var/www/q"));
    }

    #[test]
    fn numeric_host_detection() {
        assert!(is_numeric_host("127.0.0.1"));
        assert!(!is_numeric_host("a1.example.com"));
        assert!(!is_numeric_host("..."));
    }

    #[test]
    fn content_kind_detects_index_php() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(content_kind(dir.path()), ContentKind::Html);
        std::fs::write(dir.path().join("index.php"), "<?php").unwrap();
        assert_eq!(content_kind(dir.path()), ContentKind::Php);
    }
}
