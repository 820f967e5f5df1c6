use crate::config::GenerationConfig;
use crate::error::{EtlError, Result};
use crate::types::{MessageGenerator, User};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "You are a specialized financial advisor. \
Create personalized and motivating messages about investments. \
Be direct, personal, and focused on the client's financial future. \
Maximum of 120 characters.";

/// Builds the deterministic user prompt for a given user. Same user
/// attributes, same prompt.
pub fn build_prompt(user: &User) -> String {
    format!(
        "Create a personalized message for {name} about the importance of investments. \
Use this information:\n\
Client: {name}\n\
Email: {email}\n\
Company: {company}\n\
Current balance: $ {balance:.2}\n\
The message must be short, impactful, and personalized.",
        name = user.name,
        email = user.email,
        company = user.company_name(),
        balance = user.account.balance,
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn message_from_response(response: ChatResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::MissingField("choices is empty".into()))?;
    let message = choice.message.content.trim().to_string();
    if message.is_empty() {
        return Err(EtlError::MissingField("message content is empty".into()));
    }
    Ok(message)
}

/// Generator backed by an OpenAI-style chat-completions endpoint.
pub struct ChatCompletionGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionGenerator {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait::async_trait]
impl MessageGenerator for ChatCompletionGenerator {
    fn generator_name(&self) -> &'static str {
        "chat_completion"
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn generate(&self, user: &User) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(user),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("Requesting message for {}", user.name);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EtlError::Api {
                message: format!(
                    "Generation request returned status {}",
                    response.status().as_u16()
                ),
            });
        }

        let chat_response: ChatResponse = response.json().await?;
        let message = message_from_response(chat_response)?;
        info!("Generated message for {}", user.name);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, Company};

    fn test_user() -> User {
        User {
            id: 4,
            name: "Patricia Lebsack".to_string(),
            username: "Karianne".to_string(),
            email: "Julianne.OConner@kory.org".to_string(),
            phone: String::new(),
            website: String::new(),
            address: None,
            company: Some(Company {
                name: "Robel-Corkery".to_string(),
                catch_phrase: String::new(),
                bs: String::new(),
            }),
            account: Account {
                number: "0010004".to_string(),
                agency: "0001".to_string(),
                balance: 12345.67,
                limit: 5000.0,
            },
        }
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let user = test_user();
        assert_eq!(build_prompt(&user), build_prompt(&user));
    }

    #[test]
    fn test_build_prompt_includes_user_attributes() {
        let prompt = build_prompt(&test_user());
        assert!(prompt.contains("Patricia Lebsack"));
        assert!(prompt.contains("Julianne.OConner@kory.org"));
        assert!(prompt.contains("Robel-Corkery"));
        assert!(prompt.contains("12345.67"));
    }

    #[test]
    fn test_message_from_response_takes_first_choice() {
        let response = ChatResponse {
            choices: vec![
                ChatChoice {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content: "  Invest now, Patricia!  ".to_string(),
                    },
                },
                ChatChoice {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content: "second".to_string(),
                    },
                },
            ],
        };
        assert_eq!(message_from_response(response).unwrap(), "Invest now, Patricia!");
    }

    #[test]
    fn test_message_from_response_rejects_empty_choices() {
        let response = ChatResponse { choices: vec![] };
        assert!(message_from_response(response).is_err());
    }

    #[test]
    fn test_message_from_response_rejects_blank_content() {
        let response = ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: "   ".to_string(),
                },
            }],
        };
        assert!(message_from_response(response).is_err());
    }
}
