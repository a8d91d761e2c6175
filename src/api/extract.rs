//! 请求提取器
//!
//! 包装 axum 的 `Query` / `Json`，解析失败时返回统一的 `{code,message,trace_id}` 错误体，
//! 而不是 axum 默认的纯文本拒绝响应。

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, Extensions},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{api::middleware::TraceId, error::AppError};

/// 查询参数，解析失败映射为 400 `invalid_parameter`
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

/// JSON 请求体，解析失败映射为 400 `bad_request`
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(with_trace(
                &parts.extensions,
                AppError::invalid_parameter(rejection.body_text()),
            )),
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let trace = req.extensions().get::<TraceId>().cloned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "json_body_rejected");
                let err = AppError::bad_request(rejection.body_text());
                Err(match trace {
                    Some(trace) => trace.attach(err),
                    None => err,
                })
            }
        }
    }
}

fn with_trace(extensions: &Extensions, err: AppError) -> AppError {
    match extensions.get::<TraceId>() {
        Some(trace) => trace.attach(err),
        None => err,
    }
}
