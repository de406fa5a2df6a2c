use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::board::{Board, Player};

/// Enum representing all possible errors in the Quantum Tic-Tac-Toe service
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid engine: {0}")]
    InvalidEngine(String),

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// Control event rather than a failure: the last applied move ended the
    /// game. Carries the final board and the winning player.
    #[error("Game over: {winner} won")]
    GameOver { board: Board, winner: Player },

    #[error("{0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, GameError>;

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::InvalidMove(_) => StatusCode::BAD_REQUEST,
            GameError::InvalidEngine(_) => StatusCode::NOT_FOUND,
            GameError::InvalidBoard(_) => StatusCode::NOT_FOUND,
            GameError::GameOver { .. } => StatusCode::OK,
            GameError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // A finished game still answers with the regular play payload.
            GameError::GameOver { board, winner } => {
                HttpResponse::Ok().json(serde_json::json!({
                    "board": board,
                    "winner": winner,
                }))
            }
            GameError::Unexpected(cause) => {
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: format!("Server Error: {cause}"),
                })
            }
            other => HttpResponse::build(other.status_code()).json(ErrorResponse {
                error: other.to_string(),
            }),
        }
    }
}

/// Maps JSON payload failures (malformed board or move shapes, unknown engine
/// tags) to the not-found class used for unusable inbound payloads.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::NotFound().json(ErrorResponse {
        error: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}
