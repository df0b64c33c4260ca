use crate::{request::parse_url, ProxyError, Result};

/// Returns the last non-empty path segment of `url`.
///
/// `http://www.gizmag.com/lacie-12-big-thunderbolt-hard-drive/42878/`
/// yields `"42878"`. Segments keep their percent-encoding.
pub fn last_path_token(url: &str) -> Result<String> {
    let parsed = parse_url(url)?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .map(str::to_owned)
        .ok_or_else(|| ProxyError::NoPathToken(url.to_owned()))
}
