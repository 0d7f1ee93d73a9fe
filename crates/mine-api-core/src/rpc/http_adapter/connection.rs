use std::path::Path;

use reqwest::Url;

use crate::error::CoreError;

pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
    cookie_file: Option<&Path>,
) -> Result<Option<(String, String)>, CoreError> {
    match (user, pass) {
        (Some(u), Some(p)) => return Ok(Some((u.to_owned(), p.to_owned()))),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CoreError::Config(
                "both rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    let Some(cookie_file) = cookie_file else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(cookie_file).map_err(|e| {
        CoreError::Config(format!(
            "failed to read rpc cookie file {}: {e}",
            cookie_file.display()
        ))
    })?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| {
            CoreError::Config(format!("rpc cookie file {} is empty", cookie_file.display()))
        })?;

    let (cookie_user, cookie_pass) = line.split_once(':').ok_or_else(|| {
        CoreError::Config(format!(
            "rpc cookie file {} must contain `username:password`",
            cookie_file.display()
        ))
    })?;
    if cookie_user.is_empty() || cookie_pass.is_empty() {
        return Err(CoreError::Config(format!(
            "rpc cookie file {} must contain non-empty `username:password`",
            cookie_file.display()
        )));
    }

    Ok(Some((cookie_user.to_owned(), cookie_pass.to_owned())))
}

pub(super) fn parse_connection(connection: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::Config(format!(
            "invalid connection `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::Config(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}

/// Endpoint for calls scoped to `wallet`: `<base>/wallet/<name>`.
///
/// The name is pushed as a single path segment, so characters such as `/`
/// or spaces are percent-encoded instead of changing the route.
pub(super) fn wallet_url(base: &Url, wallet: &str) -> Result<Url, CoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CoreError::Config(format!("rpc url `{base}` cannot carry a wallet path")))?
        .pop_if_empty()
        .push("wallet")
        .push(wallet);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn parse_connection_http_url() {
        let parsed = parse_connection("http://127.0.0.1:18443").expect("should parse");
        assert_eq!(parsed.as_str(), "http://127.0.0.1:18443/");
    }

    #[test]
    fn parse_connection_invalid_scheme() {
        let err = parse_connection("ftp://example.com").expect_err("must reject ftp");
        assert!(err.to_string().contains("unsupported connection scheme"));
    }

    #[test]
    fn wallet_url_appends_wallet_segment() {
        let base = parse_connection("http://127.0.0.1:18443").expect("should parse");
        let url = wallet_url(&base, "wallet_1700000000000").expect("should build");
        assert_eq!(url.as_str(), "http://127.0.0.1:18443/wallet/wallet_1700000000000");
    }

    #[test]
    fn wallet_url_encodes_name_as_single_segment() {
        let base = parse_connection("http://node:18443/").expect("should parse");
        let url = wallet_url(&base, "team/alice bob").expect("should build");
        assert_eq!(url.as_str(), "http://node:18443/wallet/team%2Falice%20bob");
    }

    #[test]
    fn resolve_auth_rejects_partial_credentials() {
        let err = resolve_auth(Some("user"), None, None).expect_err("must reject partial auth");
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn resolve_auth_accepts_user_and_pass() {
        let auth = resolve_auth(Some("alice"), Some("secret"), None).expect("auth must parse");
        assert_eq!(auth, Some(("alice".to_owned(), "secret".to_owned())));
    }

    #[test]
    fn resolve_auth_reads_cookie_file() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time must be after unix epoch")
            .as_nanos();
        let cookie_path = std::env::temp_dir().join(format!("mine-api-cookie-{unique}.txt"));
        fs::write(&cookie_path, "__cookie__:token\n").expect("cookie file must be writable");

        let auth = resolve_auth(None, None, Some(&cookie_path)).expect("cookie must parse");
        assert_eq!(auth, Some(("__cookie__".to_owned(), "token".to_owned())));

        let _ = fs::remove_file(cookie_path);
    }
}
