//! Paginated attestation listing
//!
//! Endpoints:
//! - `GET {api}/repos/{owner}/{repo}/attestations/{digest}`
//! - `GET {api}/orgs/{owner}/attestations/{digest}`

use crate::config::{ClientConfig, GITHUB_API_VERSION_HEADER};
use crate::error::{Error, Result};
use crate::link::{next_url, parse_link_header, Link};
use attestation_types::Digest;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Media type GitHub expects on REST requests
const GITHUB_JSON: &str = "application/vnd.github+json";

/// One entry of an attestations listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    /// The Sigstore bundle, left untyped until the verifier parses it
    pub bundle: serde_json::Value,
    /// Repository the attestation was created in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AttestationsResponse {
    #[serde(default)]
    attestations: Vec<Attestation>,
}

/// Client for the attestations API
///
/// Every call performs network I/O; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct AttestationClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl AttestationClient {
    /// Create a client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(
            GITHUB_API_VERSION_HEADER,
            HeaderValue::from_str(&config.api_version).map_err(|e| Error::InvalidHeader {
                name: GITHUB_API_VERSION_HEADER,
                reason: e.to_string(),
            })?,
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                Error::InvalidHeader {
                    name: "authorization",
                    reason: e.to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List every attestation for `digest` in `repository` (`owner/repo`)
    pub async fn get_by_repository(
        &self,
        repository: &str,
        digest: &Digest,
    ) -> Result<Vec<Attestation>> {
        let (owner, repo) = split_repository(repository)?;
        let url = self.endpoint(&["repos", owner, repo, "attestations", &digest.to_string()])?;
        self.get_all(url).await
    }

    /// List every attestation for `digest` across repositories of `owner`
    pub async fn get_by_owner(&self, owner: &str, digest: &Digest) -> Result<Vec<Attestation>> {
        let url = self.endpoint(&["orgs", owner, "attestations", &digest.to_string()])?;
        self.get_all(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.config.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{}: cannot be a base", self.config.api_url)))?
            .pop_if_empty()
            .extend(segments);
        if let Some(per_page) = self.config.per_page {
            url.query_pairs_mut()
                .append_pair("per_page", &per_page.to_string());
        }
        Ok(url)
    }

    /// Fetch `url` and every page after it, preserving response order
    ///
    /// A `next` link back to a page already fetched is a pagination error.
    async fn get_all(&self, url: Url) -> Result<Vec<Attestation>> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(Error::Pagination(format!(
                    "next link points back to {}",
                    url
                )));
            }

            tracing::debug!("get {}", url);
            let response = self.client.get(url.clone()).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::Retrieval {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let links = response_links(response.headers())?;
            let body = response.bytes().await?;
            let page: AttestationsResponse = serde_json::from_slice(&body)?;
            tracing::debug!(count = page.attestations.len(), "received attestations");
            result.extend(page.attestations);

            next = next_url(&links, &url)?;
        }

        Ok(result)
    }
}

/// Collect the entries of every `link` header on a response
fn response_links(headers: &HeaderMap) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    for value in headers.get_all(LINK) {
        let value = value
            .to_str()
            .map_err(|e| Error::Pagination(format!("link header is not valid text: {}", e)))?;
        links.extend(parse_link_header(value)?);
    }
    Ok(links)
}

fn split_repository(repository: &str) -> Result<(&str, &str)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(Error::InvalidRepository(repository.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{MockResponse, MockServer};
    use std::collections::HashMap;

    const DIGEST: &str = "sha256:7452a6cd31d8a5588919c8806f425e37ad95752a4c148f2247e91d4451a91021";

    fn body(ids: &[u32]) -> String {
        let attestations: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({ "bundle": { "id": id }, "repository_id": 42 }))
            .collect();
        serde_json::json!({ "attestations": attestations }).to_string()
    }

    fn ids(attestations: &[Attestation]) -> Vec<u64> {
        attestations
            .iter()
            .map(|a| a.bundle["id"].as_u64().unwrap())
            .collect()
    }

    fn client(base: &str) -> AttestationClient {
        AttestationClient::new(ClientConfig::default().with_api_url(base)).unwrap()
    }

    fn digest() -> Digest {
        DIGEST.parse().unwrap()
    }

    #[tokio::test]
    async fn test_follows_next_links_across_three_pages() {
        let first = format!("/repos/octo/hello/attestations/{}", DIGEST);
        let server = MockServer::start(|base| {
            HashMap::from([
                (
                    first.clone(),
                    MockResponse::json(body(&[1, 2])).with_link(format!(
                        r#"<{base}/page2>; rel="next", <{base}/page3>; rel="last""#
                    )),
                ),
                (
                    "/page2".to_string(),
                    MockResponse::json(body(&[3])).with_link(format!(
                        r#"<{base}/page1>; rel="prev", <{base}/page3>; rel="next""#
                    )),
                ),
                (
                    "/page3".to_string(),
                    MockResponse::json(body(&[4, 5]))
                        .with_link(format!(r#"<{base}/page2>; rel="prev""#)),
                ),
            ])
        })
        .await
        .unwrap();

        let attestations = client(server.base())
            .get_by_repository("octo/hello", &digest())
            .await
            .unwrap();

        assert_eq!(ids(&attestations), vec![1, 2, 3, 4, 5]);
        assert_eq!(attestations[0].repository_id, Some(42));
        assert_eq!(
            server.paths(),
            vec![first, "/page2".to_string(), "/page3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_single_page_without_link_header() {
        let path = format!("/orgs/octo/attestations/{}", DIGEST);
        let server = MockServer::start(|_| HashMap::from([(path, MockResponse::json(body(&[7])))]))
            .await
            .unwrap();

        let attestations = client(server.base())
            .get_by_owner("octo", &digest())
            .await
            .unwrap();
        assert_eq!(ids(&attestations), vec![7]);
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_sends_github_headers() {
        let path = format!("/orgs/octo/attestations/{}", DIGEST);
        let server = MockServer::start(|_| HashMap::from([(path, MockResponse::json(body(&[])))]))
            .await
            .unwrap();

        let config = ClientConfig::default()
            .with_api_url(server.base())
            .with_token("s3cr3t");
        let client = AttestationClient::new(config).unwrap();
        assert!(client.get_by_owner("octo", &digest()).await.unwrap().is_empty());

        let request = server.requests()[0].to_ascii_lowercase();
        assert!(request.contains("accept: application/vnd.github+json"));
        assert!(request.contains("x-github-api-version: 2022-11-28"));
        assert!(request.contains("authorization: bearer s3cr3t"));
        assert!(request.contains("user-agent: attestation-verify/"));
    }

    #[test]
    fn test_unsendable_token_is_rejected() {
        let config = ClientConfig::default().with_token("line\nbreak");
        assert!(matches!(
            AttestationClient::new(config),
            Err(Error::InvalidHeader { name: "authorization", .. })
        ));
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_retrieval_error() {
        let server = MockServer::start(|_| HashMap::new()).await.unwrap();
        let err = client(server.base())
            .get_by_repository("octo/missing", &digest())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Retrieval { status: 404, .. }), "{err}");
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&base)
            .get_by_owner("octo", &digest())
            .await
            .unwrap_err();
        let Error::Http(source) = &err else {
            panic!("expected a transport error, got {err}");
        };
        assert!(source.is_connect() || source.is_request(), "{source}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_malformed_next_link_is_a_pagination_error() {
        let path = format!("/orgs/octo/attestations/{}", DIGEST);
        let server = MockServer::start(|base| {
            HashMap::from([(
                path,
                MockResponse::json(body(&[1])).with_link(format!(r#"{base}/page2; rel="next""#)),
            )])
        })
        .await
        .unwrap();

        let err = client(server.base())
            .get_by_owner("octo", &digest())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Pagination(_)), "{err}");
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_next_link_cycle_is_a_pagination_error() {
        let first = format!("/orgs/octo/attestations/{}", DIGEST);
        let server = MockServer::start(|base| {
            HashMap::from([
                (
                    first.clone(),
                    MockResponse::json(body(&[1]))
                        .with_link(format!(r#"<{base}/page2>; rel="next""#)),
                ),
                (
                    "/page2".to_string(),
                    MockResponse::json(body(&[2]))
                        .with_link(format!(r#"<{base}/page2>; rel="next""#)),
                ),
            ])
        })
        .await
        .unwrap();

        let err = client(server.base())
            .get_by_owner("octo", &digest())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Pagination(_)), "{err}");
        assert_eq!(server.paths(), vec![first, "/page2".to_string()]);
    }

    #[test]
    fn test_endpoint_urls() {
        let client = AttestationClient::new(
            ClientConfig::default()
                .with_api_url("https://ghe.example.com/api/v3/")
                .with_per_page(30),
        )
        .unwrap();
        let url = client
            .endpoint(&["repos", "octo", "hello", "attestations", &digest().to_string()])
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "https://ghe.example.com/api/v3/repos/octo/hello/attestations/{}?per_page=30",
                DIGEST
            )
        );
    }

    #[test]
    fn test_split_repository() {
        assert_eq!(split_repository("octo/hello").unwrap(), ("octo", "hello"));
        for bad in ["octo", "/hello", "octo/", "octo/hello/extra"] {
            assert!(matches!(
                split_repository(bad),
                Err(Error::InvalidRepository(_))
            ));
        }
    }
}
