//! Webhook request signing.
//!
//! The telephony provider signs each webhook with HMAC-SHA1 keyed by the
//! account auth token. The signed text is the full request URL followed by
//! every form parameter, sorted by name, as `name` + `value` with no
//! separators. The digest travels base64 encoded in `X-Twilio-Signature`.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha1::Sha1;
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

fn keyed(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
) -> Result<HmacSha1, InvalidLength> {
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())?;
    mac.update(url.as_bytes());
    for (name, value) in params {
        mac.update(name.as_bytes());
        mac.update(value.as_bytes());
    }
    Ok(mac)
}

/// Computes the signature the provider would send for this request.
pub fn sign(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, InvalidLength> {
    let mac = keyed(auth_token, url, params)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Checks a received signature in constant time.
pub fn verify(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
    signature: &str,
) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    keyed(auth_token, url, params).is_ok_and(|mac| mac.verify_slice(&expected).is_ok())
}
