//! Tipos de erro do cliente REST usado para falar com iDRAC e OME.
//!
//! Cada variante de [`ClientError`] sabe se vale a pena tentar de novo
//! ([`FailureKind::Transient`]) ou não ([`FailureKind::Fatal`]). Os laços de
//! polling fazem `match` nesse tipo em vez de capturar qualquer erro.

use thiserror::Error;

use crate::error::FailureKind;

/// Erros que podem ocorrer em uma única chamada HTTP ao controlador.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Qualquer resposta não-2xx que não seja de autenticação.
    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// HTTP 401/403: credenciais rejeitadas.
    #[error("authentication rejected (status {status})")]
    Unauthorized { status: u16 },

    /// O corpo da resposta não é JSON válido.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// O locator não pôde ser transformado em URL.
    #[error("invalid URI: {0}")]
    InvalidUri(String),
}

impl ClientError {
    /// Whether the polling loops should spend budget retrying this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Unauthorized { .. } | ClientError::InvalidUri(_) => FailureKind::Fatal,
            ClientError::Network(_) | ClientError::Http { .. } | ClientError::Decode(_) => {
                FailureKind::Transient
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display() {
        let err = ClientError::Http {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error (status 503): Service Unavailable"
        );
    }

    #[test]
    fn unauthorized_is_fatal() {
        let err = ClientError::Unauthorized { status: 401 };
        assert_eq!(err.kind(), FailureKind::Fatal);
        assert!(!err.is_transient());
    }

    #[test]
    fn server_and_decode_errors_are_transient() {
        let http = ClientError::Http {
            status: 500,
            message: "oops".into(),
        };
        assert!(http.is_transient());
        assert!(ClientError::Decode("expected value".into()).is_transient());
        assert_eq!(
            ClientError::InvalidUri("::".into()).kind(),
            FailureKind::Fatal
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
