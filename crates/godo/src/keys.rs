//! SSH key models and operations.
//!
//! Keys are addressed either by numeric id or by fingerprint; every
//! single-key operation comes in both flavours.

use crate::client::{resource_path, Client};
use crate::Result;
use godo_core::query::ListOptions;
use godo_core::{describe, Response};
use reqwest::Method;
use serde::{Deserialize, Serialize};

const KEYS_BASE_PATH: &str = "v2/account/keys";

/// An SSH key registered on the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Key {
    /// Key identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// MD5 fingerprint of the public key
    pub fingerprint: String,
    /// Public key in OpenSSH format
    pub public_key: String,
}

describe!(godo::Key {
    id,
    name,
    fingerprint,
    public_key,
});

/// Request to register a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCreateRequest {
    /// Display name
    pub name: String,
    /// Public key in OpenSSH format
    pub public_key: String,
}

describe!(godo::KeyCreateRequest { name, public_key });

/// Request to rename a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUpdateRequest {
    /// New display name
    pub name: String,
}

describe!(godo::KeyUpdateRequest { name });

#[derive(Deserialize)]
struct KeyRoot {
    ssh_key: Key,
}

#[derive(Deserialize)]
struct KeysRoot {
    ssh_keys: Vec<Key>,
}

/// SSH key operations.
#[derive(Debug, Clone, Copy)]
pub struct KeysService<'a> {
    client: &'a Client,
}

impl<'a> KeysService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List all keys.
    pub async fn list(&self, opts: &ListOptions) -> Result<(Vec<Key>, Response)> {
        let path = opts.apply(KEYS_BASE_PATH);
        let (root, response) = self.client.get_json::<KeysRoot>(&path).await?;
        Ok((root.ssh_keys, response))
    }

    /// Fetch a key by id.
    pub async fn get_by_id(&self, key_id: u64) -> Result<(Key, Response)> {
        self.get(&key_id.to_string()).await
    }

    /// Fetch a key by fingerprint.
    pub async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<(Key, Response)> {
        self.get(fingerprint).await
    }

    /// Register a key.
    pub async fn create(&self, request: &KeyCreateRequest) -> Result<(Key, Response)> {
        let (root, response) = self
            .client
            .send_json::<KeyRoot>(Method::POST, KEYS_BASE_PATH, Some(request.into()))
            .await?;
        Ok((root.ssh_key, response))
    }

    /// Rename a key addressed by id.
    pub async fn update_by_id(
        &self,
        key_id: u64,
        request: &KeyUpdateRequest,
    ) -> Result<(Key, Response)> {
        self.update(&key_id.to_string(), request).await
    }

    /// Rename a key addressed by fingerprint.
    pub async fn update_by_fingerprint(
        &self,
        fingerprint: &str,
        request: &KeyUpdateRequest,
    ) -> Result<(Key, Response)> {
        self.update(fingerprint, request).await
    }

    /// Delete a key by id.
    pub async fn delete_by_id(&self, key_id: u64) -> Result<Response> {
        self.delete(&key_id.to_string()).await
    }

    /// Delete a key by fingerprint.
    pub async fn delete_by_fingerprint(&self, fingerprint: &str) -> Result<Response> {
        self.delete(fingerprint).await
    }

    async fn get(&self, key: &str) -> Result<(Key, Response)> {
        let path = resource_path(KEYS_BASE_PATH, key)?;
        let (root, response) = self.client.get_json::<KeyRoot>(&path).await?;
        Ok((root.ssh_key, response))
    }

    async fn update(&self, key: &str, request: &KeyUpdateRequest) -> Result<(Key, Response)> {
        let path = resource_path(KEYS_BASE_PATH, key)?;
        let (root, response) = self
            .client
            .send_json::<KeyRoot>(Method::PUT, &path, Some(request.into()))
            .await?;
        Ok((root.ssh_key, response))
    }

    async fn delete(&self, key: &str) -> Result<Response> {
        let path = resource_path(KEYS_BASE_PATH, key)?;
        self.client.delete(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> Client {
        Client::builder().with_base_url(server.uri()).build().unwrap()
    }

    fn key_body(id: u64, name: &str) -> serde_json::Value {
        json!({"ssh_key": {"id": id, "name": name, "fingerprint": "aa:bb"}})
    }

    #[tokio::test]
    async fn list_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/account/keys"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ssh_keys": [{"id": 1}, {"id": 2}]})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let (keys, _) = client.keys().list(&ListOptions::default()).await.unwrap();

        assert_eq!(
            keys,
            vec![
                Key { id: 1, ..Key::default() },
                Key { id: 2, ..Key::default() },
            ]
        );
    }

    #[tokio::test]
    async fn get_key_by_id_and_fingerprint() {
        let server = MockServer::start().await;
        for route in ["/v2/account/keys/12345", "/v2/account/keys/aa:bb"] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_json(key_body(12345, "k")))
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        let (by_id, _) = client.keys().get_by_id(12345).await.unwrap();
        let (by_fingerprint, _) = client.keys().get_by_fingerprint("aa:bb").await.unwrap();

        assert_eq!(by_id.id, 12345);
        assert_eq!(by_id, by_fingerprint);
    }

    #[tokio::test]
    async fn create_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/account/keys"))
            .and(body_json(json!({"name": "name", "public_key": "ssh-rsa AAAA"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(key_body(1, "name")))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = KeyCreateRequest {
            name: "name".into(),
            public_key: "ssh-rsa AAAA".into(),
        };
        let (key, response) = client.keys().create(&request).await.unwrap();

        assert_eq!(key.id, 1);
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn update_key_by_id_and_fingerprint() {
        let server = MockServer::start().await;
        for route in ["/v2/account/keys/12345", "/v2/account/keys/aa:bb"] {
            Mock::given(method("PUT"))
                .and(path(route))
                .and(body_json(json!({"name": "renamed"})))
                .respond_with(ResponseTemplate::new(200).set_body_json(key_body(12345, "renamed")))
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        let request = KeyUpdateRequest {
            name: "renamed".into(),
        };
        let (by_id, _) = client.keys().update_by_id(12345, &request).await.unwrap();
        let (by_fingerprint, _) = client
            .keys()
            .update_by_fingerprint("aa:bb", &request)
            .await
            .unwrap();

        assert_eq!(by_id.name, "renamed");
        assert_eq!(by_fingerprint.name, "renamed");
    }

    #[tokio::test]
    async fn delete_key_by_id_and_fingerprint() {
        let server = MockServer::start().await;
        for route in ["/v2/account/keys/12345", "/v2/account/keys/aa:bb"] {
            Mock::given(method("DELETE"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        client.keys().delete_by_id(12345).await.unwrap();
        client.keys().delete_by_fingerprint("aa:bb").await.unwrap();
    }

    #[tokio::test]
    async fn empty_fingerprint_never_reaches_collection() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.keys().delete_by_fingerprint("").await.unwrap_err();
        assert!(matches!(err, godo_core::Error::InvalidRequest(_)));

        let err = client.keys().delete_by_fingerprint("aa/bb").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REQUEST");
    }

    #[test]
    fn key_stringify() {
        let key = Key {
            id: 123,
            name: "Key".into(),
            fingerprint: "fingerprint".into(),
            public_key: "public key".into(),
        };

        assert_eq!(
            key.to_string(),
            r#"godo::Key{id:123, name:"Key", fingerprint:"fingerprint", public_key:"public key"}"#
        );
    }
}
