//! 量子象棋核心类型定义
//!
//! 定义格子坐标、阵营、棋子、走法类型等基础数据类型

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::XiangqiError;

/// 棋子颜色/阵营
///
/// 红方为 0 号玩家（FEN 中大写），黑方为 1 号玩家（FEN 中小写）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opposite(&self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// 玩家编号（红 0，黑 1）
    pub fn index(&self) -> usize {
        match self {
            Color::Red => 0,
            Color::Black => 1,
        }
    }

    /// 由棋子字母的大小写判断阵营
    pub fn from_case(c: char) -> Color {
        if c.is_ascii_uppercase() {
            Color::Red
        } else {
            Color::Black
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// 将/帅
    King,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马
    Horse,
    /// 车
    Rook,
    /// 炮
    Cannon,
    /// 卒/兵
    Soldier,
}

lazy_static::lazy_static! {
    /// 棋子字母表（小写）
    ///
    /// 同时接受 g/s 与 WXF 的 k/b/n/p 写法
    static ref PIECE_SYMBOLS: HashMap<char, PieceKind> = {
        let mut m = HashMap::new();
        m.insert('k', PieceKind::King);
        m.insert('g', PieceKind::King);
        m.insert('a', PieceKind::Advisor);
        m.insert('e', PieceKind::Elephant);
        m.insert('b', PieceKind::Elephant);
        m.insert('h', PieceKind::Horse);
        m.insert('n', PieceKind::Horse);
        m.insert('r', PieceKind::Rook);
        m.insert('c', PieceKind::Cannon);
        m.insert('p', PieceKind::Soldier);
        m.insert('s', PieceKind::Soldier);
        m
    };
}

impl PieceKind {
    /// 从 FEN 字符解析（不区分大小写）
    pub fn from_fen_char(c: char) -> Option<PieceKind> {
        PIECE_SYMBOLS.get(&c.to_ascii_lowercase()).copied()
    }

    /// 转换为 FEN 字符（小写）
    pub fn to_fen_char(&self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'e',
            PieceKind::Horse => 'h',
            PieceKind::Rook => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::King => "King",
            PieceKind::Advisor => "Advisor",
            PieceKind::Elephant => "Elephant",
            PieceKind::Horse => "Horse",
            PieceKind::Rook => "Rook",
            PieceKind::Cannon => "Cannon",
            PieceKind::Soldier => "Soldier",
        };
        write!(f, "{}", name)
    }
}

/// 棋盘上的一个棋子（空格用 `None` 表示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Piece { kind, color }
    }

    /// FEN 字符：红方大写，黑方小写
    pub fn to_fen_char(&self) -> char {
        let ch = self.kind.to_fen_char();
        match self.color {
            Color::Red => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

/// 棋盘格子 (file, rank)
///
/// file: 0-8 (a-i，从左到右)
/// rank: 0-9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    /// 由 (x, y) 构造格子，调用方保证坐标在棋盘内
    pub fn new(file: i8, rank: i8) -> Self {
        debug_assert!(
            (0..=8).contains(&file) && (0..=9).contains(&rank),
            "square ({}, {}) is off the board",
            file,
            rank
        );
        Square { file, rank }
    }

    /// 转换为 0-89 的数组下标
    #[inline]
    pub fn to_index(&self) -> usize {
        (self.rank as usize) * 9 + self.file as usize
    }

    /// 从数组下标还原
    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Square {
            file: (idx % 9) as i8,
            rank: (idx / 9) as i8,
        }
    }

    /// 从坐标字符串解析（如 "a0"），文件字母不区分大小写
    pub fn parse(s: &str) -> Result<Square, XiangqiError> {
        let invalid = || XiangqiError::InvalidSquare(s.to_string());
        let mut chars = s.chars();
        let (f, r) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => (f.to_ascii_lowercase(), r),
            _ => return Err(invalid()),
        };
        let file = match f {
            'a'..='i' => (f as i8) - ('a' as i8),
            _ => return Err(invalid()),
        };
        let rank = match r {
            '0'..='9' => (r as i8) - ('0' as i8),
            _ => return Err(invalid()),
        };
        Ok(Square { file, rank })
    }

    /// 转换为坐标字符串（如 "a0"）
    pub fn to_fen_str(&self) -> String {
        let file_char = (b'a' + self.file as u8) as char;
        format!("{}{}", file_char, self.rank)
    }

    /// 全部 90 个格子，按下标顺序
    pub fn all() -> impl Iterator<Item = Square> {
        (0..90).map(Square::from_index)
    }
}

impl FromStr for Square {
    type Err = XiangqiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::parse(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_str())
    }
}

/// 走法类型（由外部合法性分析器细化，解析器只给占位值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    NullType,
    UnspecifiedStandard,
    Jump,
    Slide,
    SplitJump,
    SplitSlide,
    MergeJump,
    MergeSlide,
    HorseMove,
    HorseSplitMove,
    HorseMergeMove,
    CannonFire,
}

impl MoveType {
    pub const ALL: [MoveType; 12] = [
        MoveType::NullType,
        MoveType::UnspecifiedStandard,
        MoveType::Jump,
        MoveType::Slide,
        MoveType::SplitJump,
        MoveType::SplitSlide,
        MoveType::MergeJump,
        MoveType::MergeSlide,
        MoveType::HorseMove,
        MoveType::HorseSplitMove,
        MoveType::HorseMergeMove,
        MoveType::CannonFire,
    ];

    /// 记谱中使用的名字
    pub fn name(&self) -> &'static str {
        match self {
            MoveType::NullType => "NULL_TYPE",
            MoveType::UnspecifiedStandard => "UNSPECIFIED_STANDARD",
            MoveType::Jump => "JUMP",
            MoveType::Slide => "SLIDE",
            MoveType::SplitJump => "SPLIT_JUMP",
            MoveType::SplitSlide => "SPLIT_SLIDE",
            MoveType::MergeJump => "MERGE_JUMP",
            MoveType::MergeSlide => "MERGE_SLIDE",
            MoveType::HorseMove => "HORSE_MOVE",
            MoveType::HorseSplitMove => "HORSE_SPLIT_MOVE",
            MoveType::HorseMergeMove => "HORSE_MERGE_MOVE",
            MoveType::CannonFire => "CANNON_FIRE",
        }
    }

    pub fn from_name(name: &str) -> Option<MoveType> {
        MoveType::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 走法变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveVariant {
    Unspecified,
    Basic,
    Excluded,
    Capture,
}

impl MoveVariant {
    pub const ALL: [MoveVariant; 4] = [
        MoveVariant::Unspecified,
        MoveVariant::Basic,
        MoveVariant::Excluded,
        MoveVariant::Capture,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MoveVariant::Unspecified => "UNSPECIFIED",
            MoveVariant::Basic => "BASIC",
            MoveVariant::Excluded => "EXCLUDED",
            MoveVariant::Capture => "CAPTURE",
        }
    }

    pub fn from_name(name: &str) -> Option<MoveVariant> {
        MoveVariant::ALL.iter().copied().find(|v| v.name() == name)
    }
}

impl fmt::Display for MoveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Continue,
    Win(Color),
    Draw,
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameResult::Continue)
    }
}
