use actix_web::{
    HttpRequest, HttpResponse, Responder, ResponseError,
    http::{
        StatusCode,
        header::{self, HeaderValue},
    },
    web,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{error::ShortenError, id::Generator, repository::MappingStore},
    usecase::usecase::Usecase,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    ParamError(String),
    #[error("URL not found")]
    NotFound,
    #[error("Could not allocate a short URL")]
    Exhausted,
    #[error("Service unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error("Internal Server Error")]
    Internal(#[source] anyhow::Error),
}

impl From<ShortenError> for HandlerError {
    fn from(err: ShortenError) -> Self {
        match err {
            ShortenError::InvalidInput(msg) => HandlerError::ParamError(msg),
            ShortenError::NotFound => HandlerError::NotFound,
            ShortenError::GeneratorExhausted { .. } => HandlerError::Exhausted,
            ShortenError::StoreUnavailable(e) => HandlerError::Unavailable(e.into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::ParamError(_) => StatusCode::BAD_REQUEST,
            HandlerError::NotFound => StatusCode::NOT_FOUND,
            HandlerError::Exhausted => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            HandlerError::Unavailable(e) => tracing::error!("Store unavailable: {:?}", e),
            HandlerError::Internal(e) => tracing::error!("Internal Server Error: {:?}", e),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

pub struct Handler<G: Generator, S: MappingStore> {
    usecase: Usecase<G, S>,
}

impl<G: Generator, S: MappingStore> Handler<G, S> {
    pub fn new(usecase: Usecase<G, S>) -> Self {
        Handler { usecase }
    }

    fn extract_request_meta(req: &HttpRequest) -> (Option<String>, Option<String>, Option<String>) {
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string());
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        (ip, user_agent, request_id)
    }

    pub async fn livez(&self) -> impl Responder + use<G, S> {
        HttpResponse::Ok().body("Ok")
    }

    pub async fn readyz(&self) -> Result<impl Responder + use<G, S>, HandlerError> {
        self.usecase
            .ping()
            .await
            .map_err(|e| HandlerError::Unavailable(e.into()))?;
        Ok(HttpResponse::Ok().body("Ok"))
    }

    pub async fn shorten(
        &self,
        req: HttpRequest,
        info: web::Json<ShortenParams>,
    ) -> Result<impl Responder + use<G, S>, HandlerError> {
        let Some(long_url) = info.long_url.as_deref() else {
            return Err(HandlerError::ParamError(
                "The 'longUrl' parameter is required.".to_string(),
            ));
        };

        let id = self.usecase.shorten(long_url).await?;

        let (ip, user_agent, request_id) = Self::extract_request_meta(&req);
        tracing::info!(
            event = "short_url_created",
            id = id.as_str(),
            ip = ip.as_deref().unwrap_or(""),
            user_agent = user_agent.as_deref().unwrap_or(""),
            request_id = request_id.as_deref().unwrap_or(""),
            original_url = long_url
        );

        Ok(web::Json(ShortenResponse {
            short_url: id.into_inner(),
        }))
    }

    pub async fn redirect(
        &self,
        req: HttpRequest,
        path: web::Path<String>,
    ) -> Result<impl Responder + use<G, S>, HandlerError> {
        let id = path.into_inner();
        let (ip, user_agent, request_id) = Self::extract_request_meta(&req);

        let result = self.usecase.resolve(&id).await.map_err(HandlerError::from);
        let status_code = match &result {
            Ok(_) => StatusCode::FOUND,
            Err(e) => e.status_code(),
        };
        tracing::info!(
            event = "short_url_access",
            id = id.as_str(),
            status_code = status_code.as_u16(),
            ip = ip.as_deref().unwrap_or(""),
            user_agent = user_agent.as_deref().unwrap_or(""),
            request_id = request_id.as_deref().unwrap_or("")
        );

        let mapping = result?;
        // Raw bytes, so non-ASCII URLs are redirected exactly as submitted.
        let location = HeaderValue::from_bytes(mapping.long_url.as_bytes()).map_err(|e| {
            HandlerError::Internal(anyhow::anyhow!(
                "Stored URL for '{}' is not a valid header value: {}",
                id,
                e
            ))
        })?;
        Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish())
    }
}

#[derive(Deserialize)]
pub struct ShortenParams {
    #[serde(rename = "longUrl")]
    pub long_url: Option<String>,
}

#[derive(Serialize)]
pub struct ShortenResponse {
    #[serde(rename = "shortUrl")]
    pub short_url: String,
}
