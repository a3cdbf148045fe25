//! Directory listings for hosted example directories.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Map a request path onto a location below `root`.
///
/// Returns `None` for paths that would leave the root.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(request_path)?;
    let mut resolved = root.to_path_buf();

    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    Some(resolved)
}

/// Render an HTML listing of `dir`, linked relative to `request_path`.
pub fn render_listing(dir: &Path, request_path: &str) -> io::Result<String> {
    let mut entries: Vec<(String, bool)> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
        .collect();

    // Directories first, then files, each alphabetically
    entries.sort_by(|(a, a_dir), (b, b_dir)| b_dir.cmp(a_dir).then_with(|| a.cmp(b)));

    let base = if request_path.ends_with('/') {
        request_path.to_string()
    } else {
        format!("{}/", request_path)
    };

    let mut items = String::new();
    if base != "/" {
        items.push_str("    <li><a href=\"../\">../</a></li>\n");
    }
    for (name, is_dir) in &entries {
        let slash = if *is_dir { "/" } else { "" };
        let escaped = escape_html(name);
        items.push_str(&format!(
            "    <li><a href=\"{}{}{}\">{}{}</a></li>\n",
            escape_html(&base),
            escaped,
            slash,
            escaped,
            slash
        ));
    }

    let title = escape_html(&base);
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Index of {title}</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; }}
    ul {{ list-style: none; padding: 0; }}
    li {{ padding: 0.125rem 0; }}
  </style>
</head>
<body>
  <h1>Index of {title}</h1>
  <ul>
{items}  </ul>
</body>
</html>"#
    ))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Decode `%XX` escapes; `None` on malformed input.
fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolves_inside_root() {
        let root = Path::new("/srv/examples");
        assert_eq!(
            resolve(root, "/base/css/"),
            Some(PathBuf::from("/srv/examples/base/css"))
        );
        assert_eq!(
            resolve(root, "/my%20dir"),
            Some(PathBuf::from("/srv/examples/my dir"))
        );
        assert_eq!(resolve(root, "/"), Some(root.to_path_buf()));
    }

    #[test]
    fn rejects_escaping_paths() {
        let root = Path::new("/srv/examples");
        assert_eq!(resolve(root, "/../secret"), None);
        assert_eq!(resolve(root, "/base/%2e%2e/%2e%2e/etc"), None);
        assert_eq!(resolve(root, "/bad%zz"), None);
    }

    #[test]
    fn lists_directories_first() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("css")).unwrap();
        fs::write(temp.path().join("a.html"), "").unwrap();

        let html = render_listing(temp.path(), "/base").unwrap();

        let css = html.find("href=\"/base/css/\"").unwrap();
        let page = html.find("href=\"/base/a.html\"").unwrap();
        assert!(css < page);
        assert!(html.contains("Index of /base/"));
        assert!(html.contains("href=\"../\""));
    }

    #[test]
    fn escapes_names() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("<b>.css"), "").unwrap();

        let html = render_listing(temp.path(), "/").unwrap();

        assert!(html.contains("&lt;b&gt;.css"));
        assert!(!html.contains("<b>.css"));
        assert!(!html.contains("href=\"../\""));
    }
}
