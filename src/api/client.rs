//! HTTP implementation of [`CaptureBackend`] over `reqwest`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::contracts::{
    ClassesMeta, DeleteLayerReply, DeleteLayerRequest, ImageList, LayersInfo, LibraryResponse,
    LiveState, RawClassesMeta, SaveRequest, SaveResponse, StateResponse, StatusReply,
};
use super::{ApiError, CaptureBackend};
use crate::format::yolo::label_path;
use crate::model::CaptureItem;

/// Client for a capture server rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server path; absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T, ApiError> {
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    fn get_request<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).query(query)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_json_query(path, &[] as &[(&str, String)]).await
    }

    async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + Sync + ?Sized,
    {
        log::debug!("GET {}", path);
        let response = self.send(self.get_request(path, query), path).await?;
        Self::read_json(response, path).await
    }

    async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        log::debug!("POST {}", path);
        let request = self.client.post(self.url(path));
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = self.send(request, path).await?;
        Self::read_json(response, path).await
    }

    async fn post_status(&self, path: &str) -> Result<StatusReply, ApiError> {
        self.post_json::<(), StatusReply>(path, None).await
    }
}

impl CaptureBackend for HttpBackend {
    async fn state(&self) -> Result<LiveState, ApiError> {
        let raw: StateResponse = self.get_json("/state").await?;
        Ok(LiveState::from(raw))
    }

    async fn layers(&self) -> Result<LayersInfo, ApiError> {
        self.get_json("/layers").await
    }

    async fn library(&self, layer: u32, limit: usize) -> Result<Vec<CaptureItem>, ApiError> {
        let mut query = Vec::with_capacity(2);
        if layer > 0 {
            query.push(("layer", layer.to_string()));
        }
        query.push(("limit", limit.to_string()));
        let raw: LibraryResponse = self.get_json_query("/library", &query).await?;
        Ok(raw.captures.resolve().into_items())
    }

    async fn classes_meta(&self) -> Result<RawClassesMeta, ApiError> {
        self.get_json("/annotate/classes_meta").await
    }

    async fn save_classes_meta(&self, meta: &ClassesMeta) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_json("/annotate/classes_meta", Some(meta)).await?;
        Ok(())
    }

    async fn images(&self, split: &str) -> Result<Vec<String>, ApiError> {
        let list: ImageList = self.get_json_query("/annotate/images", &[("split", split)]).await?;
        Ok(list.images)
    }

    async fn label_text(&self, split: &str, image: &str) -> Result<Option<String>, ApiError> {
        let path = label_path(split, image);
        log::debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.clone(),
                source,
            })?;
        if !response.status().is_success() {
            log::debug!("No label file at {} (HTTP {})", path, response.status().as_u16());
            return Ok(None);
        }
        let text = response.text().await.map_err(|source| ApiError::Transport {
            path: path.clone(),
            source,
        })?;
        Ok(Some(text))
    }

    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        log::debug!("GET {}", url);
        let response = self.send(self.client.get(self.url(url)), url).await?;
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            path: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    async fn save_annotations(&self, request: &SaveRequest) -> Result<SaveResponse, ApiError> {
        self.post_json("/annotate/save", Some(request)).await
    }

    async fn start_capture(&self) -> Result<StatusReply, ApiError> {
        self.post_status("/start_capture").await
    }

    async fn reset_capture(&self) -> Result<StatusReply, ApiError> {
        self.post_status("/reset_capture").await
    }

    async fn reset_layers(&self) -> Result<StatusReply, ApiError> {
        self.post_status("/reset_layers").await
    }

    async fn delete_layer(&self, request: DeleteLayerRequest) -> Result<DeleteLayerReply, ApiError> {
        self.post_json("/library/delete_layer", Some(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new("http://rig.local:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://rig.local:8080");
        assert_eq!(backend.url("/state"), "http://rig.local:8080/state");
        assert_eq!(backend.url("static/a.jpg"), "http://rig.local:8080/static/a.jpg");
        assert_eq!(backend.url("https://cdn/x.jpg"), "https://cdn/x.jpg");
    }

    fn query_of<Q: Serialize + ?Sized>(backend: &HttpBackend, path: &str, query: &Q) -> Option<String> {
        let request = backend.get_request(path, query).build().unwrap();
        request.url().query().map(str::to_string)
    }

    #[test]
    fn test_query_parameters_are_encoded() {
        let backend = HttpBackend::new("http://rig.local", Duration::from_secs(5)).unwrap();
        assert_eq!(
            query_of(&backend, "/annotate/images", &[("split", "a b&c")]).as_deref(),
            Some("split=a+b%26c")
        );
        assert_eq!(
            query_of(&backend, "/library", &[("layer", "3"), ("limit", "200")]).as_deref(),
            Some("layer=3&limit=200")
        );
        assert_eq!(query_of(&backend, "/state", &[] as &[(&str, String)]), None);
    }
}
