//! Service-account secret material.
//!
//! The token and CA certificate are held in memory only; the convergence
//! engine stages them to disk transiently and removes them again as part of
//! each file's convergence step.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use armada_core::ServiceAccount;
use armada_remote::{CommandSpec, Session};

use crate::error::K8sError;

const TOKEN_KEY: &str = "token";
const CERT_KEY: &str = "ca.crt";

/// Decoded token and CA certificate for one service account.
pub struct SecretMaterial {
    pub token: Vec<u8>,
    pub cert: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct Secret {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Fetch and decode the secret bound to `account`.
pub fn service_account_material(
    session: &Session,
    account: &ServiceAccount,
) -> Result<SecretMaterial, K8sError> {
    let out = session.query(
        &CommandSpec::new("kubectl")
            .args(["get", "secret", &account.name, "-n", &account.namespace])
            .args(["-o", "json"]),
    )?;

    let secret: Secret = serde_json::from_slice(&out)?;
    Ok(SecretMaterial {
        token: decode_key(&secret, &account.name, TOKEN_KEY)?,
        cert: decode_key(&secret, &account.name, CERT_KEY)?,
    })
}

fn decode_key(secret: &Secret, secret_name: &str, key: &str) -> Result<Vec<u8>, K8sError> {
    let encoded = secret
        .data
        .get(key)
        .ok_or_else(|| K8sError::SecretKeyMissing {
            secret: secret_name.to_string(),
            key: key.to_string(),
        })?;
    Ok(BASE64.decode(encoded.trim())?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_with(data: &[(&str, &str)]) -> Secret {
        Secret {
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), BASE64.encode(v)))
                .collect(),
        }
    }

    #[test]
    fn decodes_token_and_cert() {
        let secret = secret_with(&[(TOKEN_KEY, "tok-bytes"), (CERT_KEY, "cert-bytes")]);
        assert_eq!(decode_key(&secret, "mover", TOKEN_KEY).expect("token"), b"tok-bytes");
        assert_eq!(decode_key(&secret, "mover", CERT_KEY).expect("cert"), b"cert-bytes");
    }

    #[test]
    fn missing_key_is_an_error() {
        let secret = secret_with(&[(TOKEN_KEY, "tok")]);
        let err = decode_key(&secret, "mover", CERT_KEY).unwrap_err();
        match err {
            K8sError::SecretKeyMissing { secret, key } => {
                assert_eq!(secret, "mover");
                assert_eq!(key, "ca.crt");
            }
            other => panic!("expected SecretKeyMissing, got {other:?}"),
        }
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let secret = Secret {
            data: [(TOKEN_KEY.to_string(), "!!not-base64!!".to_string())]
                .into_iter()
                .collect(),
        };
        assert!(matches!(
            decode_key(&secret, "mover", TOKEN_KEY).unwrap_err(),
            K8sError::Base64(_)
        ));
    }

    #[test]
    fn secret_json_parses_kubectl_shape() {
        let json = r#"{
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": {"name": "mover"},
            "data": {"token": "dG9r", "ca.crt": "Y2VydA=="}
        }"#;
        let secret: Secret = serde_json::from_str(json).expect("parse");
        assert_eq!(decode_key(&secret, "mover", TOKEN_KEY).expect("token"), b"tok");
        assert_eq!(decode_key(&secret, "mover", CERT_KEY).expect("cert"), b"cert");
    }
}
