#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No usable response: connection refused, DNS, TLS or a body that
    /// could not be decoded.
    #[error("Request to remote service failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer from the API or the asset host, with the raw body.
    #[error("Remote service answered {status}: {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The client is missing configuration needed for the operation.
    #[error("Client misconfigured: {0}")]
    Config(String),
}

/// Pass 2xx responses through; turn anything else into
/// [`ClientError::ApiError`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ClientError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
