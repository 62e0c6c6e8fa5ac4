use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid provider request: {0}")]
    RequestError(String),
    #[error("Invalid provider response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Provider declined the payment request. Code {code}. {message}")]
    PaymentDeclined { code: i64, message: String },
    #[error("Callback payload is missing the required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid currency amount: {0}")]
    InvalidAmount(String),
}
