use std::env;
use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::sse::process_sse;
use crate::types::{
    Conversation, ConversationList, ConversationRequest, ModelInfo, ModelList, ReplyEvent,
};

const DEFAULT_API_URL: &str = "https://chat.openai.com/backend-api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
const USER_AGENT: &str = concat!("colloquy/", env!("CARGO_PKG_VERSION"));

/// Environment variable consulted for the access token.
pub const ACCESS_TOKEN_ENV: &str = "COLLOQUY_ACCESS_TOKEN";

/// A lazily produced sequence of reply events.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<ReplyEvent>> + Send>>;

/// The remote chat service, as seen by the chat loop.
///
/// Everything the interactive client needs from the service goes through this trait:
/// listing and fetching conversations, renaming and deleting them, listing models and
/// streaming replies.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Fetch one page of the user's conversations.
    async fn list_conversations(&self, offset: u64, limit: u64) -> Result<ConversationList>;

    /// Fetch a conversation with its full node tree.
    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation>;

    /// Rename a conversation. Returns whether the server accepted the change.
    async fn set_conversation_title(&self, conversation_id: &str, title: &str) -> Result<bool>;

    /// Delete a conversation. Returns whether the server accepted the change.
    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool>;

    /// List the models available to the user.
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Send a user message and stream the reply.
    ///
    /// `conversation_id` is `None` for a conversation that has not been created yet.
    async fn send_message(
        &self,
        text: &str,
        model_slug: &str,
        message_id: &str,
        parent_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<ReplyStream>;

    /// Ask for another answer to an existing user message.
    async fn regenerate_reply(
        &self,
        text: &str,
        model_slug: &str,
        conversation_id: &str,
        message_id: &str,
        parent_id: &str,
    ) -> Result<ReplyStream>;

    /// Have the service title a conversation after its first exchange.
    async fn generate_title(
        &self,
        conversation_id: &str,
        model_slug: &str,
        message_id: &str,
    ) -> Result<String>;

    /// The credential the client authenticates with.
    fn access_token(&self) -> &str;
}

/// Client for the ChatGPT backend API.
#[derive(Debug, Clone)]
pub struct ChatGpt {
    access_token: String,
    client: ReqwestClient,
    base_url: Url,
    headers: HeaderMap,
}

impl ChatGpt {
    /// Create a new client.
    ///
    /// The access token can be provided directly or read from the
    /// `COLLOQUY_ACCESS_TOKEN` environment variable.
    pub fn new(access_token: Option<String>) -> Result<Self> {
        Self::with_options(access_token, None, None)
    }

    /// Create a new client with a custom API root and an optional proxy.
    pub fn with_options(
        access_token: Option<String>,
        base_url: Option<String>,
        proxy: Option<String>,
    ) -> Result<Self> {
        let access_token = match access_token {
            Some(token) => token,
            None => env::var(ACCESS_TOKEN_ENV).map_err(|_| {
                Error::authentication(format!(
                    "access token not provided and {ACCESS_TOKEN_ENV} environment variable not set"
                ))
            })?,
        };

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;

        let mut builder = ReqwestClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(&proxy).map_err(|e| {
                Error::http_client(format!("Invalid proxy {proxy}: {e}"), Some(Box::new(e)))
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        let headers = Self::default_headers(&access_token)?;
        Ok(Self {
            access_token,
            client,
            base_url,
            headers,
        })
    }

    /// Create the headers sent with every request.
    fn default_headers(access_token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| Error::authentication("access token contains invalid characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self
            .client
            .request(method, self.endpoint(path)?)
            .headers(self.headers.clone()))
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_status(status_code, &body, retry_after),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    fn request_error(e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(Self::request_error)?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn patch_conversation(
        &self,
        conversation_id: &str,
        body: serde_json::Value,
    ) -> Result<bool> {
        #[derive(Deserialize)]
        struct SuccessResponse {
            #[serde(default)]
            success: bool,
        }

        let request = self.request(Method::PATCH, &format!("conversation/{conversation_id}"))?;
        let response = self.execute(request.json(&body)).await?;
        let result: SuccessResponse = Self::json(response).await?;
        Ok(result.success)
    }

    async fn stream_conversation(&self, request: ConversationRequest) -> Result<ReplyStream> {
        let mut headers = self.headers.clone();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let url = self.endpoint("conversation")?;
        let response = self
            .execute(self.client.post(url).headers(headers).json(&request))
            .await?;
        Ok(Box::pin(process_sse(response.bytes_stream())))
    }
}

#[async_trait::async_trait]
impl ChatBackend for ChatGpt {
    async fn list_conversations(&self, offset: u64, limit: u64) -> Result<ConversationList> {
        let request = self
            .request(Method::GET, "conversations")?
            .query(&[("offset", offset), ("limit", limit)]);
        let response = self.execute(request).await?;
        Self::json(response).await
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        let request = self.request(Method::GET, &format!("conversation/{conversation_id}"))?;
        let response = self.execute(request).await?;
        Self::json(response).await
    }

    async fn set_conversation_title(&self, conversation_id: &str, title: &str) -> Result<bool> {
        self.patch_conversation(conversation_id, serde_json::json!({ "title": title }))
            .await
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool> {
        self.patch_conversation(conversation_id, serde_json::json!({ "is_visible": false }))
            .await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self.execute(self.request(Method::GET, "models")?).await?;
        let list: ModelList = Self::json(response).await?;
        Ok(list.models)
    }

    async fn send_message(
        &self,
        text: &str,
        model_slug: &str,
        message_id: &str,
        parent_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<ReplyStream> {
        let request =
            ConversationRequest::next(text, model_slug, message_id, parent_id, conversation_id);
        self.stream_conversation(request).await
    }

    async fn regenerate_reply(
        &self,
        text: &str,
        model_slug: &str,
        conversation_id: &str,
        message_id: &str,
        parent_id: &str,
    ) -> Result<ReplyStream> {
        let request =
            ConversationRequest::variant(text, model_slug, conversation_id, message_id, parent_id);
        self.stream_conversation(request).await
    }

    async fn generate_title(
        &self,
        conversation_id: &str,
        model_slug: &str,
        message_id: &str,
    ) -> Result<String> {
        #[derive(Deserialize)]
        struct TitleResponse {
            title: String,
        }

        let request = self.request(
            Method::POST,
            &format!("conversation/gen_title/{conversation_id}"),
        )?;
        let body = serde_json::json!({ "model": model_slug, "message_id": message_id });
        let response = self.execute(request.json(&body)).await?;
        let result: TitleResponse = Self::json(response).await?;
        Ok(result.title)
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Maps an error status and its body onto an [`Error`].
fn error_from_status(status_code: u16, body: &str, retry_after: Option<u64>) -> Error {
    // The backend reports failures as {"detail": "..."} or {"detail": {...}}
    #[derive(Deserialize)]
    struct ErrorResponse {
        detail: Option<serde_json::Value>,
    }

    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.detail);
    let error_message = match &detail {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Object(o)) => o
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    };

    match status_code {
        400 => Error::bad_request(error_message),
        401 => Error::authentication(error_message),
        403 => Error::permission(error_message),
        404 => Error::not_found(error_message, None, None),
        408 => Error::timeout(error_message),
        429 => Error::rate_limit(error_message, retry_after),
        500 => Error::internal_server(error_message),
        502..=504 => Error::service_unavailable(error_message, retry_after),
        _ => Error::api(status_code, detail.map(|d| d.to_string()), error_message),
    }
}
