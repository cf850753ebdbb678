use ring::hmac;

use siphon_shared::GameError;

/// Field of the assertion carrying the message authentication code.
const MAC_FIELD: &str = "hash";
/// Required field carrying the external identity id.
const ID_FIELD: &str = "id";
/// Optional field carrying the preferred display name.
const USERNAME_FIELD: &str = "username";

/// Identity fields extracted from a verified assertion.
#[derive(Debug, PartialEq)]
pub(crate) struct AssertionClaims {
    pub external_id: String,
    pub username: Option<String>,
}

/// Verifies a signed identity assertion against the server secret.
///
/// The assertion is a byte string of `key=value` pairs joined by `&`, one of
/// which is the hex-encoded MAC under `hash`. The check must match the
/// client-side signer exactly: strip the `hash` field, join the remaining
/// pairs sorted lexicographically by key with `\n` separators, compute
/// HMAC-SHA256 of that string with the server secret, and compare against
/// the supplied MAC in constant time.
pub(crate) fn verify_assertion(
    key: &hmac::Key,
    assertion: &[u8],
) -> Result<AssertionClaims, GameError> {
    let text = std::str::from_utf8(assertion).map_err(|_| GameError::BadSignature)?;

    let mut supplied_mac: Option<&str> = None;
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for field in text.split('&').filter(|field| !field.is_empty()) {
        let (field_key, value) = field.split_once('=').ok_or(GameError::BadSignature)?;
        if field_key == MAC_FIELD {
            supplied_mac = Some(value);
        } else {
            pairs.push((field_key, value));
        }
    }
    let supplied_mac = supplied_mac.ok_or(GameError::BadSignature)?;
    let mac_bytes = hex::decode(supplied_mac).map_err(|_| GameError::BadSignature)?;

    pairs.sort();
    let data_check = pairs
        .iter()
        .map(|(field_key, value)| format!("{field_key}={value}"))
        .collect::<Vec<String>>()
        .join("\n");

    // ring's verify is the constant-time comparison.
    hmac::verify(key, data_check.as_bytes(), &mac_bytes).map_err(|_| GameError::BadSignature)?;

    let external_id = pairs
        .iter()
        .find(|(field_key, _)| *field_key == ID_FIELD)
        .map(|(_, value)| value.to_string())
        .ok_or(GameError::BadSignature)?;
    let username = pairs
        .iter()
        .find(|(field_key, _)| *field_key == USERNAME_FIELD)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty());

    Ok(AssertionClaims {
        external_id,
        username,
    })
}
