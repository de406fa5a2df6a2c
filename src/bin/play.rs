//! Interactive terminal client for a running quantum-tictactoe server.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, Response};
use serde_json::Value;

use quantum_tictactoe::api::game::{
    PlayMoveRequest, PlayMoveResponse, StartGameRequest, StartGameResponse,
};
use quantum_tictactoe::game::board::{Board, Cell, EngineKind};
use quantum_tictactoe::game::moves::{CollapseMove, MarkMove};

const CELL_WIDTH: usize = 18;

fn main() -> Result<()> {
    let url = std::env::var("SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());
    let engine = match std::env::var("USE_DUMMY") {
        Ok(_) => EngineKind::Dummy,
        Err(_) => EngineKind::Case,
    };
    let client = Client::new();

    let response = client
        .post(format!("{url}/games/start"))
        .json(&StartGameRequest { engine })
        .send()
        .context("failed to reach the game server")?;
    if !response.status().is_success() {
        bail!("ERR : {}", error_text(response));
    }
    let start: StartGameResponse = response.json()?;
    let mut board = start.board;

    loop {
        print_board(&board);

        let (mark_move, collapse_move) = if let Some((first, second)) = board.pending_collapse {
            println!("Which cell to collapse between {first} and {second}");
            let selected_cell = prompt("Type cell index: ")?;
            (None, Some(CollapseMove { selected_cell }))
        } else {
            println!("Which cells to mark ?");
            let first_cell = prompt("first cell index: ")?;
            let second_cell = prompt("second cell index: ")?;
            (
                Some(MarkMove {
                    first_cell,
                    second_cell,
                }),
                None,
            )
        };

        let response = client
            .post(format!("{url}/games/play"))
            .json(&PlayMoveRequest {
                mark_move,
                collapse_move,
                previous_board: board.clone(),
            })
            .send()?;
        if !response.status().is_success() {
            println!("ERR : {}", error_text(response));
            continue;
        }

        let played: PlayMoveResponse = response.json()?;
        if let Some(winner) = played.winner {
            print_board(&played.board);
            println!("{winner} WON !");
            return Ok(());
        }
        board = played.board;
    }
}

fn error_text(response: Response) -> String {
    response
        .json::<Value>()
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown error".to_string())
}

fn prompt(label: &str) -> Result<usize> {
    loop {
        print!("{label}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("expected a cell index"),
        }
    }
}

fn print_board(board: &Board) {
    let ruler = "-".repeat((CELL_WIDTH + 1) * board.board_size);
    for (index, cell) in board.cells.iter().enumerate() {
        if index % board.board_size == 0 {
            println!();
            println!("{ruler}");
        }
        print!("{:<width$}|", cell_label(index, cell), width = CELL_WIDTH);
    }
    println!();
    println!("{ruler}");
}

fn cell_label(index: usize, cell: &Cell) -> String {
    if let Some(mark) = &cell.collapsed_mark {
        format!(" {}{} ", mark.player_id, mark.round_index)
    } else {
        let marks: Vec<String> = cell
            .quantic_marks
            .iter()
            .map(|mark| format!("{}{}", mark.player_id, mark.round_index))
            .collect();
        format!(" ({index})  {}", marks.join(" "))
    }
}
