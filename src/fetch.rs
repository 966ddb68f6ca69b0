use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Course page the homework files are published under.
pub const BASE_URL: &str = "http://rpucella.net/courses/focs-fa19/homeworks/";

static OCAML_FILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\Ahomework(\d{1,2})\.ml").unwrap());

/// Connects `homeworkN.ml` to the corresponding `homeworkN.html` page URL.
/// Returns `None` when the filename doesn't follow the homework pattern.
pub fn infer_url(filepath: &Path) -> Option<String> {
    let filename = filepath.file_name()?.to_str()?;
    let caps = OCAML_FILE_RE.captures(filename)?;
    Some(format!("{BASE_URL}homework{}.html", &caps[1]))
}

/// Last path component of the URL, used as the cache file name.
fn page_name(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("focstest-cache")
}

/// Fetches the page body, serving it from `cache_dir` unless absent or
/// `update_cache` is set. A freshly fetched body is written back to the
/// cache.
pub fn fetch_page(url: &str, cache_dir: &Path, update_cache: bool) -> Result<String> {
    if !cache_dir.exists() {
        fs::create_dir_all(cache_dir).with_context(|| {
            format!("failed to create cache directory {}", cache_dir.display())
        })?;
        info!(dir = %cache_dir.display(), "created cache directory");
    }
    let cached = cache_dir.join(page_name(url));

    if cached.is_file() && !update_cache {
        debug!(file = %cached.display(), "using cached page");
        return fs::read_to_string(&cached)
            .with_context(|| format!("failed to read cached page {}", cached.display()));
    }

    let response = ureq::get(url)
        .call()
        .with_context(|| format!("unable to fetch url {url}"))?;
    if response.status() != 200 {
        return Err(anyhow!(
            "unable to fetch url {url}: status {} {}",
            response.status(),
            response.status_text()
        ));
    }
    let html = response
        .into_string()
        .with_context(|| format!("failed to read response body from {url}"))?;

    fs::write(&cached, &html)
        .with_context(|| format!("failed to write cache file {}", cached.display()))?;
    debug!(url, file = %cached.display(), "saved page to cache");
    Ok(html)
}
