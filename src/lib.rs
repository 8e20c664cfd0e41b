//! Quantum Xiangqi rules core
//!
//! 量子象棋规则核心 - 分裂/合并走法记谱、FEN 棋盘加载、胜负判定

pub mod board;
pub mod error;
pub mod fen;
pub mod game;
pub mod moves;
pub mod test_positions;
pub mod types;

pub use board::{flying_general, BoardBackend, ClassicalBoard, MoveOutcome, Occupancy};
pub use error::XiangqiError;
pub use fen::{
    load_board_description, parse_fen, to_board_description, to_fen, BoardLayout, FenState,
    INITIAL_FEN,
};
pub use game::{GameConfig, GameSession, TurnOutcome, HELP_TEXT};
pub use moves::{Move, MoveShape};
pub use types::{Color, GameResult, MoveType, MoveVariant, Piece, PieceKind, Square};
