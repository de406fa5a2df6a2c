use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::{GameError, Result};
use crate::game::board::{Board, EngineKind, Player};
use crate::game::engine::{DummyEngine, Engine};
use crate::game::moves::{CollapseMove, MarkMove, Move};
use crate::game::opponent::RandomOpponent;
use crate::game::rules::CaseEngine;

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub engine: EngineKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub board: Board,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayMoveRequest {
    pub mark_move: Option<MarkMove>,
    pub collapse_move: Option<CollapseMove>,
    pub previous_board: Board,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayMoveResponse {
    pub board: Board,
    pub winner: Option<Player>,
}

/// Configure game-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(start).service(play);
}

/// Routes an engine tag to its ruleset. Engines carry no state, so one is
/// built per request.
fn engine_for(kind: EngineKind, board_size: usize) -> Box<dyn Engine> {
    match kind {
        EngineKind::Dummy => Box::new(DummyEngine::new(board_size)),
        EngineKind::Case => Box::new(CaseEngine::new(board_size)),
    }
}

#[post("/start")]
async fn start(
    config: web::Data<AppConfig>,
    request: web::Json<StartGameRequest>,
) -> Result<HttpResponse> {
    let engine = engine_for(request.engine, config.game.board_size);
    let mut opponent = RandomOpponent::from_entropy();

    let board = engine.start_game(&mut opponent)?;
    Ok(HttpResponse::Ok().json(StartGameResponse { board }))
}

#[post("/play")]
async fn play(request: web::Json<PlayMoveRequest>) -> Result<HttpResponse> {
    let PlayMoveRequest {
        mark_move,
        collapse_move,
        previous_board,
    } = request.into_inner();

    let mv = match (mark_move, collapse_move) {
        (Some(mark_move), None) => Move::Mark(mark_move),
        (None, Some(collapse_move)) => Move::Collapse(collapse_move),
        (None, None) => {
            return Err(GameError::InvalidMove(
                "collapse_move and mark_move cannot both be null".into(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(GameError::InvalidMove(
                "collapse_move and mark_move cannot both be set".into(),
            ))
        }
    };

    previous_board.validate()?;

    let engine = engine_for(previous_board.engine, previous_board.board_size);
    let mut opponent = RandomOpponent::from_entropy();

    let board = engine.play_move(&mv, &previous_board, &mut opponent)?;
    Ok(HttpResponse::Ok().json(PlayMoveResponse {
        board,
        winner: None,
    }))
}
