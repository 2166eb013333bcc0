//! Minimal AWS Signature Version 4 signer.
//!
//! Signs `host`, `x-amz-date`, `x-amz-content-sha256` and, for temporary
//! credentials, `x-amz-security-token`. Query strings are not signed; the
//! agent runtime calls carry none.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use chatrelay_types::error::RelayError;

use crate::credentials::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Headers to attach to the signed request, `authorization` last.
pub type SignedHeaders = Vec<(&'static str, String)>;

pub fn sign_request(
    credentials: &AwsCredentials,
    region: &str,
    service: &str,
    method: &str,
    url: &reqwest::Url,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedHeaders, RelayError> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let payload_hash = hex_sha256(body);

    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(RelayError::Internal(format!("cannot sign URL without host: {url}")));
        }
    };

    let mut headers = vec![
        ("host", host),
        ("x-amz-content-sha256", payload_hash.clone()),
        ("x-amz-date", amz_date.clone()),
    ];
    let token = credentials
        .session_token
        .as_ref()
        .map(|t| t.expose_secret().to_string());
    if let Some(token) = &token {
        headers.push(("x-amz-security-token", token.clone()));
    }

    let (canonical, signed_headers) = canonical_request(
        method,
        &canonical_uri(url.path()),
        url.query().unwrap_or(""),
        &headers,
        &payload_hash,
    );

    let scope = format!("{date}/{region}/{service}/aws4_request");
    let string_to_sign = format!("{ALGORITHM}\n{amz_date}\n{scope}\n{}", hex_sha256(canonical.as_bytes()));
    let key = signing_key(credentials.secret_access_key.expose_secret(), &date, region, service)?;
    let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes())?);

    let mut signed = vec![
        ("x-amz-date", amz_date),
        ("x-amz-content-sha256", payload_hash),
    ];
    if let Some(token) = token {
        signed.push(("x-amz-security-token", token));
    }
    signed.push((
        "authorization",
        format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id
        ),
    ));
    Ok(signed)
}

/// Build the canonical request. Returns it with the signed-headers list.
fn canonical_request(
    method: &str,
    canonical_uri: &str,
    query: &str,
    headers: &[(&str, String)],
    payload_hash: &str,
) -> (String, String) {
    let mut headers: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let request = format!(
        "{method}\n{canonical_uri}\n{query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    );
    (request, signed_headers)
}

/// Every path segment encoded again, as required for services other than S3.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Percent-encode everything except the RFC 3986 unreserved set.
pub fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, RelayError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, RelayError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| RelayError::Internal(format!("HMAC key error: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex_sha256(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
