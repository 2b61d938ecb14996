// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

//! AWS-backed implementations of the provisioner's service seams.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ecr::primitives::DateTimeFormat;
use aws_sdk_ecr::types::{ImageDetail, ImageIdentifier};
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ssm::types::ParameterType;
use log::debug;
use std::collections::BTreeMap;

use crate::image::{ImageRegistry, ImageSummary};
use crate::{Regions, ResourceBackend, ResourceKind, ServiceError};

pub async fn load_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

impl ServiceError {
    fn from_sdk<E>(err: E) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error,
    {
        Self::new(err.code(), DisplayErrorContext(&err).to_string())
    }
}

/// Secrets Manager and SSM clients, one of each per region.
pub struct AwsBackend {
    secrets: BTreeMap<String, aws_sdk_secretsmanager::Client>,
    parameters: BTreeMap<String, aws_sdk_ssm::Client>,
}

impl AwsBackend {
    pub async fn new(regions: &Regions) -> Self {
        let mut secrets = BTreeMap::new();
        let mut parameters = BTreeMap::new();
        for region in regions.iter() {
            let config = load_config(region).await;
            secrets.insert(
                region.to_string(),
                aws_sdk_secretsmanager::Client::new(&config),
            );
            parameters.insert(region.to_string(), aws_sdk_ssm::Client::new(&config));
        }
        Self {
            secrets,
            parameters,
        }
    }

    fn secrets(&self, region: &str) -> Result<&aws_sdk_secretsmanager::Client, ServiceError> {
        self.secrets.get(region).ok_or_else(|| no_client(region))
    }

    fn parameters(&self, region: &str) -> Result<&aws_sdk_ssm::Client, ServiceError> {
        self.parameters.get(region).ok_or_else(|| no_client(region))
    }
}

fn no_client(region: &str) -> ServiceError {
    ServiceError::new(None, format!("no client configured for region {region}"))
}

#[async_trait]
impl ResourceBackend for AwsBackend {
    async fn create(
        &self,
        region: &str,
        kind: ResourceKind,
        name: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        match kind {
            ResourceKind::Secret => {
                self.secrets(region)?
                    .create_secret()
                    .name(name)
                    .secret_string(value)
                    .send()
                    .await
                    .map_err(|e| ServiceError::from_sdk(e.into_service_error()))?;
            }
            ResourceKind::Parameter => {
                self.parameters(region)?
                    .put_parameter()
                    .name(name)
                    .value(value)
                    .r#type(ParameterType::SecureString)
                    .overwrite(false)
                    .send()
                    .await
                    .map_err(|e| ServiceError::from_sdk(e.into_service_error()))?;
            }
        }
        Ok(())
    }

    async fn delete(
        &self,
        region: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<(), ServiceError> {
        match kind {
            ResourceKind::Secret => {
                self.secrets(region)?
                    .delete_secret()
                    .secret_id(name)
                    .force_delete_without_recovery(true)
                    .send()
                    .await
                    .map_err(|e| ServiceError::from_sdk(e.into_service_error()))?;
            }
            ResourceKind::Parameter => {
                self.parameters(region)?
                    .delete_parameter()
                    .name(name)
                    .send()
                    .await
                    .map_err(|e| ServiceError::from_sdk(e.into_service_error()))?;
            }
        }
        Ok(())
    }
}

/// ECR client for the region an image lives in.
pub struct EcrRegistry {
    client: aws_sdk_ecr::Client,
}

impl EcrRegistry {
    pub async fn new(region: &str) -> Self {
        let config = load_config(region).await;
        Self {
            client: aws_sdk_ecr::Client::new(&config),
        }
    }

    async fn latest(&self, repository: &str) -> Result<Option<ImageDetail>, ServiceError> {
        let mut latest: Option<ImageDetail> = None;
        let mut next_token = None;
        loop {
            let page = self
                .client
                .describe_images()
                .repository_name(repository)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| ServiceError::from_sdk(e.into_service_error()))?;
            latest = newest(latest.iter().chain(page.image_details())).cloned();
            next_token = page.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(latest);
            }
            debug!("Fetching next page of images in {repository}");
        }
    }
}

/// Most recently pushed of `images`. Images without a push time lose to any
/// that have one; ties keep the earlier image.
fn newest<'a>(images: impl IntoIterator<Item = &'a ImageDetail>) -> Option<&'a ImageDetail> {
    images.into_iter().reduce(|best, image| {
        if pushed_at(image) > pushed_at(best) {
            image
        } else {
            best
        }
    })
}

fn pushed_at(image: &ImageDetail) -> Option<(i64, u32)> {
    image
        .image_pushed_at()
        .map(|t| (t.secs(), t.subsec_nanos()))
}

#[async_trait]
impl ImageRegistry for EcrRegistry {
    async fn find_image(
        &self,
        repository: &str,
        tag: Option<&str>,
    ) -> Result<Option<ImageSummary>, ServiceError> {
        let image = match tag {
            Some(tag) => self
                .client
                .describe_images()
                .repository_name(repository)
                .image_ids(ImageIdentifier::builder().image_tag(tag).build())
                .send()
                .await
                .map_err(|e| ServiceError::from_sdk(e.into_service_error()))?
                .image_details()
                .first()
                .cloned(),
            None => self.latest(repository).await?,
        };

        Ok(image.map(|image| ImageSummary {
            digest: image.image_digest().unwrap_or_default().to_string(),
            tags: image.image_tags().to_vec(),
            pushed_at: image
                .image_pushed_at()
                .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
                .unwrap_or_default(),
        }))
    }
}
