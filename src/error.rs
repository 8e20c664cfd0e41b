//! 错误类型
//!
//! 记谱解析、棋盘加载和走棋过程中的错误都归入 `XiangqiError`。
//!
//! - 记谱类错误（`InvalidSquare`、`InvalidMoveSyntax`、`InvalidMeasurementSuffix`、
//!   `UnknownMoveType`、`UnknownMoveVariant`）和 `RejectedMove` 可以在输入循环处恢复：
//!   提示玩家后重新输入，回合不前进。
//! - 棋盘描述类错误（`MalformedBoardDescription`、`UnknownPieceSymbol`、`InvalidGeneralCount`）
//!   只在开局加载时出现，没有可用的棋盘，会话无法建立。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XiangqiError {
    /// 两字符格子坐标不合法（a0 到 i9 之外）
    InvalidSquare(String),
    /// 走法文本不符合三种形状中的任何一种
    InvalidMoveSyntax(String),
    /// `.mD` 测量后缀格式错误
    InvalidMeasurementSuffix(String),
    /// 记谱中的走法类型名未知
    UnknownMoveType(String),
    /// 记谱中的走法变体名未知
    UnknownMoveVariant(String),
    /// 棋盘描述某一行展开后不是 9 格，或行数不对
    MalformedBoardDescription { row: usize, reason: String },
    /// 棋盘描述中出现未知棋子字母
    UnknownPieceSymbol(char),
    /// 开局棋盘不是双方各一个将/帅
    InvalidGeneralCount(usize),
    /// 棋盘后端拒绝执行该走法
    RejectedMove(String),
}

impl XiangqiError {
    /// 是否可以在输入循环中恢复（重新输入即可）
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            XiangqiError::MalformedBoardDescription { .. }
                | XiangqiError::UnknownPieceSymbol(_)
                | XiangqiError::InvalidGeneralCount(_)
        )
    }
}

impl fmt::Display for XiangqiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XiangqiError::InvalidSquare(token) => write!(
                f,
                "Invalid square '{}': squares range from a0 to i9",
                token
            ),
            XiangqiError::InvalidMoveSyntax(text) => write!(
                f,
                "Invalid move '{}': expected s1t1, s1^t1t2 or s1s2^t1",
                text
            ),
            XiangqiError::InvalidMeasurementSuffix(text) => write!(
                f,
                "Invalid measurement suffix in '{}': expected .m0 or .m1",
                text
            ),
            XiangqiError::UnknownMoveType(name) => write!(f, "Unknown move type: {}", name),
            XiangqiError::UnknownMoveVariant(name) => {
                write!(f, "Unknown move variant: {}", name)
            }
            XiangqiError::MalformedBoardDescription { row, reason } => {
                write!(f, "Malformed board description at row {}: {}", row, reason)
            }
            XiangqiError::UnknownPieceSymbol(c) => write!(f, "Unknown piece symbol: {}", c),
            XiangqiError::InvalidGeneralCount(n) => write!(
                f,
                "Expected one general per side, found {} general square(s)",
                n
            ),
            XiangqiError::RejectedMove(reason) => write!(f, "Move rejected: {}", reason),
        }
    }
}

impl std::error::Error for XiangqiError {}
