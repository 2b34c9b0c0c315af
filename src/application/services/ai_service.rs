//! AI Service - prompt expansion for bulk art generation and text completion

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{AssetTemplate, BulkGenerationRequest, GenerationPrompt};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::{AiProviderPort, CompletionRequest, CompletionResponse};
use crate::domain::services::{expand_alternatives, variant_count, AssetVariant};
use crate::domain::value_objects::UserId;

/// Upper bound on prompts produced by one bulk request
pub const MAX_BULK_PROMPTS: usize = 1000;

const SYSTEM_PROMPT: &str = "You are a creative assistant for tabletop role-playing games. \
Answer with game-ready content only.";

#[async_trait]
pub trait AiService: Send + Sync {
    /// One prompt per variant of every template
    fn bulk_prompts(&self, request: &BulkGenerationRequest) -> ServiceResult<Vec<GenerationPrompt>>;

    async fn generate_text(
        &self,
        user: UserId,
        request: CompletionRequest,
    ) -> ServiceResult<CompletionResponse>;
}

#[derive(Clone)]
pub struct AiServiceImpl {
    provider: Arc<dyn AiProviderPort>,
}

impl AiServiceImpl {
    pub fn new(provider: Arc<dyn AiProviderPort>) -> Self {
        Self { provider }
    }
}

fn build_prompt(template: &AssetTemplate, variant: &AssetVariant, style: Option<&str>) -> String {
    let mut parts = vec![template.name.trim().to_string()];
    parts.push(format!("{:?}", template.kind).to_lowercase());
    if let Some(category) = template.category.as_deref().filter(|c| !c.trim().is_empty()) {
        parts.push(category.trim().to_string());
    }
    parts.extend(variant.values().into_iter().map(str::to_string));
    if !template.description.trim().is_empty() {
        parts.push(template.description.trim().to_string());
    }
    if let Some(style) = style.filter(|s| !s.trim().is_empty()) {
        parts.push(style.trim().to_string());
    }
    parts.join(", ")
}

#[async_trait]
impl AiService for AiServiceImpl {
    #[instrument(skip(self, request), fields(templates = request.templates.len()))]
    fn bulk_prompts(&self, request: &BulkGenerationRequest) -> ServiceResult<Vec<GenerationPrompt>> {
        if request.templates.is_empty() {
            return Err(ServiceError::invalid("At least one template is required"));
        }
        let mut errors = Vec::new();
        for (i, template) in request.templates.iter().enumerate() {
            if template.name.trim().is_empty() {
                errors.push(format!("Template {} name cannot be empty", i));
            }
        }
        ServiceError::check(errors)?;

        let total = request
            .templates
            .iter()
            .try_fold(0usize, |total, t| total.checked_add(variant_count(&t.alternatives)?));
        if total.is_none_or(|total| total > MAX_BULK_PROMPTS) {
            return Err(ServiceError::invalid(format!(
                "Bulk generation cannot exceed {} prompts",
                MAX_BULK_PROMPTS
            )));
        }

        let mut prompts = Vec::with_capacity(total.unwrap_or_default());
        for template in &request.templates {
            for variant in expand_alternatives(&template.alternatives) {
                prompts.push(GenerationPrompt {
                    template_name: template.name.clone(),
                    prompt: build_prompt(template, &variant, request.style.as_deref()),
                    variant_id: variant.variant_id,
                });
            }
        }

        debug!(prompts = prompts.len(), "Expanded bulk generation request");
        Ok(prompts)
    }

    #[instrument(skip(self, request), fields(user_id = %user))]
    async fn generate_text(
        &self,
        user: UserId,
        mut request: CompletionRequest,
    ) -> ServiceResult<CompletionResponse> {
        if request.prompt.trim().is_empty() {
            return Err(ServiceError::invalid("Prompt cannot be empty"));
        }
        if request.system_prompt.is_none() {
            request = request.with_system_prompt(SYSTEM_PROMPT);
        }

        let response = self.provider.complete(request).await?;
        info!(
            model = %response.model,
            completion_tokens = ?response.completion_tokens,
            "Generated text"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::AiError;
    use crate::domain::entities::AssetKind;
    use crate::domain::services::AlternativeDefinition;
    use std::sync::Mutex;

    struct EchoProvider {
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl AiProviderPort for EchoProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
            let content = request.prompt.to_uppercase();
            self.seen.lock().unwrap().push(request);
            Ok(CompletionResponse {
                content,
                model: "echo".to_string(),
                prompt_tokens: None,
                completion_tokens: Some(1),
            })
        }
    }

    struct Unconfigured;

    #[async_trait]
    impl AiProviderPort for Unconfigured {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, AiError> {
            Err(AiError::NotConfigured)
        }
    }

    fn template(name: &str, alternatives: AlternativeDefinition) -> AssetTemplate {
        AssetTemplate {
            name: name.to_string(),
            kind: AssetKind::Character,
            category: Some("humanoid".to_string()),
            description: String::new(),
            alternatives,
        }
    }

    #[test]
    fn test_bulk_prompts_one_per_variant() {
        let service = AiServiceImpl::new(Arc::new(Unconfigured));
        let request = BulkGenerationRequest {
            templates: vec![
                template(
                    "Guard",
                    AlternativeDefinition {
                        gender: Some(vec!["male".into(), "female".into()]),
                        equipment: Some(vec!["spear".into()]),
                        ..Default::default()
                    },
                ),
                template("Barrel", AlternativeDefinition::default()),
            ],
            style: Some("top-down token".to_string()),
        };

        let prompts = service.bulk_prompts(&request).unwrap();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0].variant_id, "male-spear");
        assert_eq!(
            prompts[0].prompt,
            "Guard, character, humanoid, male, spear, top-down token"
        );
        assert_eq!(prompts[2].template_name, "Barrel");
        assert_eq!(prompts[2].variant_id, "base");
    }

    #[test]
    fn test_bulk_prompts_reject_oversized_products_before_expanding() {
        let service = AiServiceImpl::new(Arc::new(Unconfigured));
        let values: Vec<String> = (0..20).map(|i| format!("v{}", i)).collect();
        let request = BulkGenerationRequest {
            templates: vec![template(
                "Guard",
                AlternativeDefinition {
                    gender: Some(values.clone()),
                    class: Some(values.clone()),
                    equipment: Some(values.clone()),
                    vestment: Some(values.clone()),
                    material: Some(values.clone()),
                    quality: Some(values),
                },
            )],
            style: None,
        };

        match service.bulk_prompts(&request) {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors, vec!["Bulk generation cannot exceed 1000 prompts".to_string()])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bulk_prompts_validate_templates() {
        let service = AiServiceImpl::new(Arc::new(Unconfigured));
        let empty = BulkGenerationRequest {
            templates: vec![],
            style: None,
        };
        assert!(matches!(service.bulk_prompts(&empty), Err(ServiceError::Validation(_))));

        let unnamed = BulkGenerationRequest {
            templates: vec![template(" ", AlternativeDefinition::default())],
            style: None,
        };
        assert!(matches!(service.bulk_prompts(&unnamed), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_generate_text_adds_default_system_prompt() {
        let provider = Arc::new(EchoProvider {
            seen: Mutex::new(Vec::new()),
        });
        let service = AiServiceImpl::new(provider.clone());

        let response = service
            .generate_text(UserId::new(), CompletionRequest::new("a tavern name"))
            .await
            .unwrap();
        assert_eq!(response.content, "A TAVERN NAME");
        assert_eq!(
            provider.seen.lock().unwrap()[0].system_prompt.as_deref(),
            Some(SYSTEM_PROMPT)
        );
    }

    #[tokio::test]
    async fn test_generate_text_surfaces_provider_errors() {
        let service = AiServiceImpl::new(Arc::new(Unconfigured));
        let result = service
            .generate_text(UserId::new(), CompletionRequest::new("hello"))
            .await;
        assert!(matches!(result, Err(ServiceError::Ai(AiError::NotConfigured))));

        let blank = service
            .generate_text(UserId::new(), CompletionRequest::new("   "))
            .await;
        assert!(matches!(blank, Err(ServiceError::Validation(_))));
    }
}
