//! FEN 棋盘描述解析和生成
//!
//! 格式: `<棋盘> [<回合信息>]`
//!
//! 棋盘从第 9 行写到第 0 行，行之间用 `/` 分隔：
//! - 红方（0 号玩家）：大写字母 K(将) A(士) E(象) H(马) R(车) C(炮) P(兵)
//! - 黑方（1 号玩家）：对应的小写字母
//! - 空格：数字 (1-9)
//!
//! 回合信息中含有 `w` 表示红方先走，否则黑方先走。

use log::debug;

use crate::error::XiangqiError;
use crate::types::{Color, Piece, PieceKind, Square};

/// 默认开局局面
pub const INITIAL_FEN: &str =
    "RHEAKAEHR/9/1C5C1/P1P1P1P1P/9/9/p1p1p1p1p/1c5c1/9/rheakaehr w---1";

/// 解析后的棋盘布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    /// 90 个格子 (10行 x 9列)，下标见 `Square::to_index`
    squares: [Option<Piece>; 90],
    /// 按出现顺序（从上到下）记录的将/帅位置
    pub king_squares: Vec<Square>,
}

impl BoardLayout {
    /// 空棋盘
    pub fn empty() -> Self {
        BoardLayout {
            squares: [None; 90],
            king_squares: Vec::new(),
        }
    }

    /// 获取某格的棋子
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.to_index()]
    }

    /// 放置或清除某格的棋子
    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.to_index()] = piece;
    }

    /// 全部 90 个格子及其内容
    pub fn squares(&self) -> impl Iterator<Item = (Square, Option<Piece>)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .map(|(i, p)| (Square::from_index(i), *p))
    }

    /// 所有有子的格子
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares().filter_map(|(sq, p)| p.map(|p| (sq, p)))
    }

    pub fn occupied_count(&self) -> usize {
        self.squares.iter().filter(|p| p.is_some()).count()
    }
}

/// FEN 解析后的状态
#[derive(Debug, Clone)]
pub struct FenState {
    pub layout: BoardLayout,
    pub turn: Color,
}

/// 解析完整 FEN（棋盘 + 回合信息）
///
/// 没有回合信息时默认红方先走
pub fn parse_fen(fen: &str) -> Result<FenState, XiangqiError> {
    let fen = fen.trim();
    let (board_str, meta) = match fen.split_once(char::is_whitespace) {
        Some((board, meta)) => (board, meta.trim()),
        None => (fen, "w"),
    };

    let layout = load_board_description(board_str)?;
    let turn = if meta.contains('w') {
        Color::Red
    } else {
        Color::Black
    };

    Ok(FenState { layout, turn })
}

/// 解析棋盘描述字符串
///
/// 只负责解析，不检查将帅数量，找到几个就返回几个
pub fn load_board_description(board_str: &str) -> Result<BoardLayout, XiangqiError> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != 10 {
        return Err(XiangqiError::MalformedBoardDescription {
            row: rows.len().min(10),
            reason: format!("expected 10 rows, got {}", rows.len()),
        });
    }

    let mut layout = BoardLayout::empty();

    for (row_idx, row_str) in rows.iter().enumerate() {
        // FEN 从上往下是 rank 9 到 rank 0
        let rank = (9 - row_idx) as i8;
        let mut file: i8 = 0;

        for ch in row_str.chars() {
            if ('1'..='9').contains(&ch) {
                file += (ch as i8) - ('0' as i8);
                if file > 9 {
                    return Err(XiangqiError::MalformedBoardDescription {
                        row: row_idx,
                        reason: format!("'{}' expands past 9 files", row_str),
                    });
                }
                continue;
            }

            let kind = PieceKind::from_fen_char(ch).ok_or(XiangqiError::UnknownPieceSymbol(ch))?;
            if file >= 9 {
                return Err(XiangqiError::MalformedBoardDescription {
                    row: row_idx,
                    reason: format!("'{}' expands past 9 files", row_str),
                });
            }

            let sq = Square::new(file, rank);
            if kind == PieceKind::King {
                layout.king_squares.push(sq);
            }
            layout.set(sq, Some(Piece::new(kind, Color::from_case(ch))));
            file += 1;
        }

        if file != 9 {
            return Err(XiangqiError::MalformedBoardDescription {
                row: row_idx,
                reason: format!("'{}' has {} files, expected 9", row_str, file),
            });
        }
    }

    debug!(
        "loaded board description: {} pieces, kings at {:?}",
        layout.occupied_count(),
        layout.king_squares
    );

    Ok(layout)
}

/// 由棋盘布局生成棋盘描述字符串
pub fn to_board_description(layout: &BoardLayout) -> String {
    let mut rows = Vec::with_capacity(10);

    // 从 rank 9 到 rank 0
    for rank in (0..10).rev() {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for file in 0..9 {
            match layout.get(Square::new(file, rank)) {
                Some(piece) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(piece.to_fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    rows.join("/")
}

/// 生成完整 FEN
pub fn to_fen(layout: &BoardLayout, turn: Color) -> String {
    let turn_char = match turn {
        Color::Red => 'w',
        Color::Black => 'b',
    };
    format!("{} {}", to_board_description(layout), turn_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;

    #[test]
    fn test_parse_initial_fen() {
        let state = parse_fen(INITIAL_FEN).unwrap();
        let layout = &state.layout;

        assert_eq!(state.turn, Color::Red);
        assert_eq!(layout.squares().count(), 90);
        assert_eq!(layout.occupied_count(), 32);

        // 将帅在 e9 和 e0，上面一行先出现
        assert_eq!(
            layout.king_squares,
            vec![Square::parse("e9").unwrap(), Square::parse("e0").unwrap()]
        );
        assert_eq!(
            layout.get(Square::parse("e9").unwrap()),
            Some(Piece::new(PieceKind::King, Color::Red))
        );
        assert_eq!(
            layout.get(Square::parse("b2").unwrap()),
            Some(Piece::new(PieceKind::Cannon, Color::Black))
        );
        assert_eq!(layout.get(Square::parse("e5").unwrap()), None);
    }

    #[test]
    fn test_turn_metadata() {
        let state = parse_fen(test_positions::KINGS_ONLY_BLACK_TO_MOVE).unwrap();
        assert_eq!(state.turn, Color::Black);

        // 没有回合信息时红方先走
        let state = parse_fen("4k4/9/9/9/9/9/9/9/9/4K4").unwrap();
        assert_eq!(state.turn, Color::Red);
    }

    #[test]
    fn test_original_piece_letters() {
        let layout = load_board_description("3aga3/9/9/9/4s4/9/9/9/9/3AGA3").unwrap();
        assert_eq!(layout.king_squares.len(), 2);
        assert_eq!(
            layout.get(Square::parse("e5").unwrap()),
            Some(Piece::new(PieceKind::Soldier, Color::Black))
        );
    }

    #[test]
    fn test_king_count_not_enforced() {
        let layout = load_board_description("9/9/9/9/9/9/9/9/9/4K4").unwrap();
        assert_eq!(layout.king_squares, vec![Square::new(4, 0)]);
    }

    #[test]
    fn test_malformed_rows() {
        // 第 2 行只有 8 格
        let err = load_board_description("9/9/8/9/9/9/9/9/9/9").unwrap_err();
        assert!(matches!(
            err,
            XiangqiError::MalformedBoardDescription { row: 2, .. }
        ));

        // 第 0 行超过 9 格
        let err = load_board_description("RHEAKAEHR1/9/9/9/9/9/9/9/9/9").unwrap_err();
        assert!(matches!(
            err,
            XiangqiError::MalformedBoardDescription { row: 0, .. }
        ));

        // 数字越界
        let err = load_board_description("9/9/9/9/9/9/9/9/5R4/9").unwrap_err();
        assert!(matches!(
            err,
            XiangqiError::MalformedBoardDescription { row: 8, .. }
        ));

        // 行数不对
        let err = load_board_description("9/9/9").unwrap_err();
        assert!(matches!(
            err,
            XiangqiError::MalformedBoardDescription { row: 3, .. }
        ));
    }

    #[test]
    fn test_unknown_piece_symbol() {
        let err = load_board_description("4x4/9/9/9/9/9/9/9/9/9").unwrap_err();
        assert_eq!(err, XiangqiError::UnknownPieceSymbol('x'));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_fen_roundtrip() {
        let state = parse_fen(INITIAL_FEN).unwrap();
        assert_eq!(
            to_board_description(&state.layout),
            "RHEAKAEHR/9/1C5C1/P1P1P1P1P/9/9/p1p1p1p1p/1c5c1/9/rheakaehr"
        );
        assert_eq!(
            to_fen(&state.layout, Color::Black),
            "RHEAKAEHR/9/1C5C1/P1P1P1P1P/9/9/p1p1p1p1p/1c5c1/9/rheakaehr b"
        );
    }
}
