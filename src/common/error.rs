// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// SQLSTATEs que indicam conflito de concorrência (transitórios, o chamador pode repetir)
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Produto {0} não encontrado")]
    ProductNotFound(i32),

    #[error("Produto com código de barras '{0}' não encontrado")]
    BarcodeNotFound(String),

    #[error("Transação {0} não encontrada")]
    TransactionNotFound(i32),

    #[error("Máquina {0} não encontrada")]
    MachineNotFound(i32),

    #[error("Planejamento {0} não encontrado")]
    PlanningNotFound(i32),

    #[error("Rota não encontrada: {0}")]
    RouteNotFound(String),

    #[error("Estoque insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Tipo de operação inválido: '{0}'")]
    InvalidOperationKind(String),

    #[error("Saldo resultante inválido: {0}")]
    InvalidBalance(i64),

    #[error("Quantidade inválida: {0}")]
    InvalidQuantity(i32),

    #[error("Intervalo de datas inválido: {0}")]
    InvalidDateRange(String),

    #[error("Código de barras '{0}' já está em uso")]
    BarcodeAlreadyExists(String),

    #[error("Já existe uma máquina chamada '{0}'")]
    MachineNameAlreadyExists(String),

    #[error("Conflito de concorrência: {0}")]
    ConcurrencyConflict(String),

    #[error("Erro de banco de dados: {0}")]
    PersistenceFailure(sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// Não usamos #[from] aqui: lock timeout / deadlock / falha de serialização
// viram ConcurrencyConflict (409), o resto é PersistenceFailure (500).
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if let Some(code) = db_err.code() {
                if matches!(&*code, SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE) {
                    return AppError::ConcurrencyConflict(db_err.message().to_string());
                }
            }
        }
        AppError::PersistenceFailure(e)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ProductNotFound(_)
            | AppError::BarcodeNotFound(_)
            | AppError::TransactionNotFound(_)
            | AppError::MachineNotFound(_)
            | AppError::PlanningNotFound(_)
            | AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,

            AppError::ValidationError(_)
            | AppError::InsufficientStock { .. }
            | AppError::InvalidOperationKind(_)
            | AppError::InvalidBalance(_)
            | AppError::InvalidQuantity(_)
            | AppError::InvalidDateRange(_)
            | AppError::MachineNameAlreadyExists(_) => StatusCode::BAD_REQUEST,

            AppError::BarcodeAlreadyExists(_) | AppError::ConcurrencyConflict(_) => StatusCode::CONFLICT,

            AppError::PersistenceFailure(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }

            // Erros de infraestrutura: loga o detalhe, devolve mensagem genérica.
            ref e @ (AppError::PersistenceFailure(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }

            AppError::ConcurrencyConflict(ref detail) => {
                tracing::warn!(detail = %detail, "Conflito de concorrência");
                "O registro está sendo alterado por outra operação. Tente novamente.".to_string()
            }

            other => other.to_string(),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
