// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

//! Pre-flight check that the private provider image a test run installs
//! actually exists in ECR.

use async_trait::async_trait;
use log::info;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::ServiceError;
use crate::aws::EcrRegistry;

pub const REPOSITORY_NOT_FOUND: &str = "RepositoryNotFoundException";

static ECR_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.dkr\.ecr\.([^.]+)\.amazonaws\.com/([^:]+)(?::(.+))?")
        .expect("ECR URI pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
    #[error("Invalid ECR image URI format: {0}")]
    InvalidUri(String),
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),
    #[error("No images found in repository: {0}")]
    NoImages(String),
    #[error("Error validating image: {0}")]
    Service(#[source] ServiceError),
}

/// `{account}.dkr.ecr.{region}.amazonaws.com/{repository}[:{tag}]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    uri: String,
    pub account: String,
    pub region: String,
    pub repository: String,
    pub tag: Option<String>,
}

impl ImageRef {
    pub fn parse(uri: &str) -> Result<Self, ValidationError> {
        let caps = ECR_URI
            .captures(uri)
            .ok_or_else(|| ValidationError::InvalidUri(uri.to_string()))?;
        Ok(Self {
            uri: uri.to_string(),
            account: caps[1].to_string(),
            region: caps[2].to_string(),
            repository: caps[3].to_string(),
            tag: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub digest: String,
    pub tags: Vec<String>,
    pub pushed_at: String,
}

#[async_trait]
pub trait ImageRegistry: Send + Sync {
    /// Looks up `tag`, or the most recently pushed image when `tag` is `None`.
    async fn find_image(
        &self,
        repository: &str,
        tag: Option<&str>,
    ) -> Result<Option<ImageSummary>, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    pub uri: String,
    pub digest: String,
    pub pushed_at: String,
}

impl fmt::Display for ValidatedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✓ Image validated: {}", self.uri)?;
        writeln!(f, "  Digest: {}", self.digest)?;
        write!(f, "  Pushed at: {}", self.pushed_at)
    }
}

pub async fn validate<R: ImageRegistry + ?Sized>(
    registry: &R,
    image: &ImageRef,
) -> Result<ValidatedImage, ValidationError> {
    let summary = match registry
        .find_image(&image.repository, image.tag.as_deref())
        .await
    {
        Ok(Some(summary)) => summary,
        Ok(None) => return Err(ValidationError::NoImages(image.to_string())),
        Err(e) if e.code() == Some(REPOSITORY_NOT_FOUND) => {
            return Err(ValidationError::RepositoryNotFound(image.repository.clone()));
        }
        Err(e) => return Err(ValidationError::Service(e)),
    };

    // Untagged references resolve to whatever was pushed last; show which.
    let uri = match &image.tag {
        Some(_) => image.to_string(),
        None => {
            let tag = summary
                .tags
                .first()
                .map(String::as_str)
                .unwrap_or("<untagged>");
            format!("{image}:{tag}")
        }
    };

    Ok(ValidatedImage {
        uri,
        digest: summary.digest,
        pushed_at: summary.pushed_at,
    })
}

/// Validates the image named by `uri` (normally `$PRIVREPO`) against the
/// ECR registry of the region it names.
pub async fn validate_uri(uri: Option<&str>) -> Result<ValidatedImage, ValidationError> {
    let uri = uri
        .filter(|u| !u.is_empty())
        .ok_or(ValidationError::MissingEnv("PRIVREPO"))?;
    let image = ImageRef::parse(uri)?;
    info!(
        "Validating image in repository {} ({})",
        image.repository, image.region
    );
    let registry = EcrRegistry::new(&image.region).await;
    validate(&registry, &image).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const URI: &str = "123456789012.dkr.ecr.us-west-2.amazonaws.com/myrepo";

    struct MockRegistry {
        response: fn() -> Result<Option<ImageSummary>, ServiceError>,
        requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl MockRegistry {
        fn new(response: fn() -> Result<Option<ImageSummary>, ServiceError>) -> Self {
            Self {
                response,
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl ImageRegistry for MockRegistry {
        async fn find_image(
            &self,
            repository: &str,
            tag: Option<&str>,
        ) -> Result<Option<ImageSummary>, ServiceError> {
            self.requests
                .lock()
                .unwrap()
                .push((repository.to_string(), tag.map(str::to_string)));
            (self.response)()
        }
    }

    fn found() -> Result<Option<ImageSummary>, ServiceError> {
        Ok(Some(ImageSummary {
            digest: "sha256:abc".to_string(),
            tags: vec!["v2".to_string(), "latest".to_string()],
            pushed_at: "2025-01-01T00:00:00Z".to_string(),
        }))
    }

    #[test]
    fn test_parse_with_tag() {
        let image = ImageRef::parse(&format!("{URI}:v1")).unwrap();
        assert_eq!(image.account, "123456789012");
        assert_eq!(image.region, "us-west-2");
        assert_eq!(image.repository, "myrepo");
        assert_eq!(image.tag.as_deref(), Some("v1"));
    }

    #[test]
    fn test_parse_without_tag() {
        let image = ImageRef::parse(URI).unwrap();
        assert_eq!(image.repository, "myrepo");
        assert_eq!(image.tag, None);
    }

    #[test]
    fn test_parse_nested_repository() {
        let uri = "123456789012.dkr.ecr.eu-west-1.amazonaws.com/team/provider:1.2.3";
        let image = ImageRef::parse(uri).unwrap();
        assert_eq!(image.region, "eu-west-1");
        assert_eq!(image.repository, "team/provider");
        assert_eq!(image.tag.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_parse_invalid() {
        for uri in ["not-a-valid-uri", "docker.io/library/nginx:latest", ""] {
            assert!(matches!(
                ImageRef::parse(uri),
                Err(ValidationError::InvalidUri(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_validate_tagged() {
        let registry = MockRegistry::new(found);
        let image = ImageRef::parse(&format!("{URI}:v1")).unwrap();

        let validated = validate(&registry, &image).await.unwrap();

        assert_eq!(validated.uri, format!("{URI}:v1"));
        assert_eq!(validated.digest, "sha256:abc");
        assert_eq!(
            registry.requests.lock().unwrap()[0],
            ("myrepo".to_string(), Some("v1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_validate_latest_appends_tag() {
        let registry = MockRegistry::new(found);
        let image = ImageRef::parse(URI).unwrap();

        let validated = validate(&registry, &image).await.unwrap();

        assert_eq!(validated.uri, format!("{URI}:v2"));
        assert_eq!(
            registry.requests.lock().unwrap()[0],
            ("myrepo".to_string(), None)
        );
        assert!(validated.to_string().starts_with("✓ Image validated: "));
    }

    #[tokio::test]
    async fn test_validate_latest_untagged() {
        let registry = MockRegistry::new(|| {
            Ok(Some(ImageSummary {
                digest: "sha256:def".to_string(),
                tags: vec![],
                pushed_at: String::new(),
            }))
        });
        let image = ImageRef::parse(URI).unwrap();

        let validated = validate(&registry, &image).await.unwrap();
        assert_eq!(validated.uri, format!("{URI}:<untagged>"));
    }

    #[tokio::test]
    async fn test_validate_repository_not_found() {
        let registry = MockRegistry::new(|| {
            Err(ServiceError::new(Some(REPOSITORY_NOT_FOUND), "no such repo"))
        });
        let image = ImageRef::parse(URI).unwrap();

        let err = validate(&registry, &image).await.unwrap_err();
        assert!(matches!(err, ValidationError::RepositoryNotFound(ref r) if r == "myrepo"));
        assert_eq!(err.to_string(), "Repository not found: myrepo");
    }

    #[tokio::test]
    async fn test_validate_empty_repository() {
        let registry = MockRegistry::new(|| Ok(None));
        let image = ImageRef::parse(URI).unwrap();

        let err = validate(&registry, &image).await.unwrap_err();
        assert!(matches!(err, ValidationError::NoImages(_)));
    }

    #[tokio::test]
    async fn test_validate_other_service_error() {
        let registry = MockRegistry::new(|| {
            Err(ServiceError::new(Some("ImageNotFoundException"), "no such tag"))
        });
        let image = ImageRef::parse(&format!("{URI}:nope")).unwrap();

        let err = validate(&registry, &image).await.unwrap_err();
        assert!(matches!(err, ValidationError::Service(_)));
    }

    #[tokio::test]
    async fn test_validate_uri_rejects_before_network() {
        let err = validate_uri(Some("not-a-valid-uri")).await.unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUri(_)));

        let err = validate_uri(None).await.unwrap_err();
        assert_eq!(err.to_string(), "PRIVREPO environment variable not set");

        let err = validate_uri(Some("")).await.unwrap_err();
        assert!(matches!(err, ValidationError::MissingEnv("PRIVREPO")));
    }
}
