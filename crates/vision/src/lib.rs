//! # prodmatch-vision: Google Cloud Vision Provider
//!
//! Implements `VisionProvider` on top of the Cloud Vision REST endpoint
//! `images:annotate`. One request asks for labels, web detection, localized
//! objects and text at once.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use prodmatch::{
    errors::MatchError,
    providers::VisionProvider,
    types::{
        MatchingPage, ScoredEntity, SimilarImage, TextAnnotation, VisionResult, WebDetection,
    },
};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Upper bound on entries per scored list.
const MAX_RESULTS: u32 = 10;

// --- Vision-specific request and response structures ---

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<ImageRequest<'a>>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: ImageContent,
    features: Vec<Feature<'a>>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    web_detection: Option<WebDetectionResponse>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Deserialize, Debug)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct LocalizedObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct WebDetectionResponse {
    #[serde(default)]
    web_entities: Vec<EntityAnnotation>,
    #[serde(default)]
    pages_with_matching_images: Vec<WebPage>,
    #[serde(default)]
    visually_similar_images: Vec<WebImage>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WebPage {
    url: String,
    #[serde(default)]
    page_title: Option<String>,
}

#[derive(Deserialize, Debug)]
struct WebImage {
    url: String,
}

#[derive(Deserialize, Debug)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl From<ImageResponse> for VisionResult {
    fn from(response: ImageResponse) -> Self {
        let web = response.web_detection.unwrap_or_default();
        VisionResult {
            labels: response.label_annotations.into_iter().map(scored).collect(),
            web_detection: WebDetection {
                web_entities: web.web_entities.into_iter().map(scored).collect(),
                pages_with_matching_images: web
                    .pages_with_matching_images
                    .into_iter()
                    .map(|p| MatchingPage {
                        url: p.url,
                        page_title: p.page_title,
                    })
                    .collect(),
                visually_similar_images: web
                    .visually_similar_images
                    .into_iter()
                    .map(|i| SimilarImage { url: i.url })
                    .collect(),
            },
            objects: response
                .localized_object_annotations
                .into_iter()
                .map(|o| ScoredEntity {
                    description: o.name,
                    score: o.score,
                })
                .collect(),
            texts: response
                .text_annotations
                .into_iter()
                .map(|t| TextAnnotation {
                    description: t.description,
                    score: t.score,
                })
                .collect(),
        }
    }
}

fn scored(entity: EntityAnnotation) -> ScoredEntity {
    ScoredEntity {
        description: entity.description,
        score: entity.score,
    }
}

// --- Google Vision Provider implementation ---

/// A provider for the Google Cloud Vision API, authenticated with an API key.
#[derive(Clone, Debug)]
pub struct GoogleVisionProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
}

impl GoogleVisionProvider {
    /// Creates a new `GoogleVisionProvider`.
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, MatchError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(MatchError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl VisionProvider for GoogleVisionProvider {
    async fn annotate(&self, image: &[u8]) -> Result<VisionResult, MatchError> {
        let request_body = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![
                    Feature {
                        kind: "LABEL_DETECTION",
                        max_results: Some(MAX_RESULTS),
                    },
                    Feature {
                        kind: "WEB_DETECTION",
                        max_results: Some(MAX_RESULTS),
                    },
                    Feature {
                        kind: "OBJECT_LOCALIZATION",
                        max_results: Some(MAX_RESULTS),
                    },
                    Feature {
                        kind: "TEXT_DETECTION",
                        max_results: None,
                    },
                ],
            }],
        };

        info!("Sending {} byte image to the vision service.", image.len());
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| MatchError::Vision(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MatchError::Vision(format!("HTTP {status}: {error_text}")));
        }

        let annotate_response: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| MatchError::Vision(format!("invalid response body: {e}")))?;

        let image_response = annotate_response
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| MatchError::Vision("response contained no results".to_string()))?;

        if let Some(status) = &image_response.error {
            return Err(MatchError::Vision(format!(
                "annotation error {}: {}",
                status.code, status.message
            )));
        }

        let result = VisionResult::from(image_response);
        debug!(
            labels = result.labels.len(),
            web_entities = result.web_detection.web_entities.len(),
            objects = result.objects.len(),
            texts = result.texts.len(),
            "Vision annotation complete."
        );
        Ok(result)
    }
}
