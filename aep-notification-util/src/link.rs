use url::Url;

const SAFE_SCHEMES: [&str; 3] = ["https", "http", "mailto"];

/// Check if URL is safe to open (http, https, mailto only)
pub fn is_safe_url(url: &Url) -> bool {
  SAFE_SCHEMES.contains(&url.scheme())
}

/// Open a click-through target with the system handler
pub fn open_link(url: &Url) -> Result<(), std::io::Error> {
  if !is_safe_url(url) {
    return Err(std::io::Error::new(
      std::io::ErrorKind::InvalidInput,
      "Unsafe URL scheme",
    ));
  }
  tracing::info!("Opening {}", url);
  open::that(url.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
  }

  #[test]
  fn test_safe_urls() {
    assert!(is_safe_url(&url("https://www.adobe.com")));
    assert!(is_safe_url(&url("HTTP://example.com")));
    assert!(is_safe_url(&url("mailto:test@example.com")));
  }

  #[test]
  fn test_unsafe_urls() {
    assert!(!is_safe_url(&url("javascript:alert(1)")));
    assert!(!is_safe_url(&url("file:///etc/passwd")));
    assert!(!is_safe_url(&url("data:text/html,hi")));
    assert!(!is_safe_url(&url("myapp://deep/link")));
  }

  #[test]
  fn test_open_link_refuses_unsafe_scheme() {
    let err = open_link(&url("file:///etc/passwd")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
  }
}
