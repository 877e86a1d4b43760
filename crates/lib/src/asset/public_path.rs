//! Public URL rewriting for compiled stylesheets.

use std::path::{Path, PathBuf};

/// Maps logical asset paths to the paths they are published under.
pub trait PublicPathResolver {
  /// Public URL path for a logical asset path.
  fn resolve_public_path(&self, logical_path: &str) -> String;

  /// Directory public assets are written to.
  fn public_filesystem_path(&self) -> PathBuf;
}

/// Wraps a resolver so `.scss` assets are published with a `.css` extension.
#[derive(Debug, Clone)]
pub struct CssExtensionResolver<R> {
  inner: R,
}

/// Publish `.scss` assets under `.css` names.
pub fn with_css_extension<R: PublicPathResolver>(inner: R) -> CssExtensionResolver<R> {
  CssExtensionResolver { inner }
}

impl<R> CssExtensionResolver<R> {
  pub fn inner(&self) -> &R {
    &self.inner
  }
}

impl<R: PublicPathResolver> PublicPathResolver for CssExtensionResolver<R> {
  fn resolve_public_path(&self, logical_path: &str) -> String {
    let path = self.inner.resolve_public_path(logical_path);
    match path.strip_suffix(".scss") {
      Some(stem) => format!("{stem}.css"),
      None => path,
    }
  }

  fn public_filesystem_path(&self) -> PathBuf {
    let path = self.inner.public_filesystem_path();
    if path.extension().is_some_and(|ext| ext == "scss") {
      path.with_extension("css")
    } else {
      path
    }
  }
}

impl<R: PublicPathResolver + ?Sized> PublicPathResolver for &R {
  fn resolve_public_path(&self, logical_path: &str) -> String {
    (**self).resolve_public_path(logical_path)
  }

  fn public_filesystem_path(&self) -> PathBuf {
    (**self).public_filesystem_path()
  }
}

/// Serves everything under a fixed URL prefix and output directory.
#[derive(Debug, Clone)]
pub struct PrefixResolver {
  pub url_prefix: String,
  pub public_dir: PathBuf,
}

impl PrefixResolver {
  pub fn new(url_prefix: impl Into<String>, public_dir: impl AsRef<Path>) -> Self {
    Self {
      url_prefix: url_prefix.into(),
      public_dir: public_dir.as_ref().to_path_buf(),
    }
  }
}

impl PublicPathResolver for PrefixResolver {
  fn resolve_public_path(&self, logical_path: &str) -> String {
    format!(
      "{}/{}",
      self.url_prefix.trim_end_matches('/'),
      logical_path.trim_start_matches('/')
    )
  }

  fn public_filesystem_path(&self) -> PathBuf {
    self.public_dir.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rewrites_trailing_scss_only() {
    let resolver = with_css_extension(PrefixResolver::new("/assets/", "/srv/public/assets"));

    assert_eq!(resolver.resolve_public_path("styles/app.scss"), "/assets/styles/app.css");
    assert_eq!(resolver.resolve_public_path("styles/app.css"), "/assets/styles/app.css");
    assert_eq!(resolver.resolve_public_path("scss.d/readme.txt"), "/assets/scss.d/readme.txt");
  }

  #[test]
  fn forwards_filesystem_path() {
    let resolver = with_css_extension(PrefixResolver::new("/assets", "/srv/public/assets"));
    assert_eq!(resolver.public_filesystem_path(), PathBuf::from("/srv/public/assets"));

    let file = with_css_extension(PrefixResolver::new("/", "/srv/site.scss"));
    assert_eq!(file.public_filesystem_path(), PathBuf::from("/srv/site.css"));
  }

  #[test]
  fn wraps_borrowed_resolvers() {
    let base = PrefixResolver::new("/build", "/tmp/out");
    let wrapped = with_css_extension(&base);
    assert_eq!(wrapped.resolve_public_path("a.scss"), "/build/a.css");
    assert_eq!(wrapped.inner().url_prefix, "/build");
  }
}
