//! 棋盘后端
//!
//! 规则核心只通过 `BoardBackend` 与棋盘打交道：执行走法、取坍缩后的占位快照、取将帅位置。
//! 后端内部如何表示叠加态与规则核心无关。
//!
//! `ClassicalBoard` 是经典（无叠加）的参考实现：分裂走法立即按测量结果落到其中一个终点。

use log::{debug, warn};
use rand::prelude::*;

use crate::error::XiangqiError;
use crate::fen::{to_fen, BoardLayout};
use crate::moves::{Move, MoveShape};
use crate::types::{Color, Piece, PieceKind, Square};

/// 坍缩后的占位快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    occupied: [bool; 90],
}

impl Occupancy {
    pub fn empty() -> Self {
        Occupancy {
            occupied: [false; 90],
        }
    }

    pub fn from_layout(layout: &BoardLayout) -> Self {
        let mut occ = Occupancy::empty();
        for (sq, _) in layout.occupied() {
            occ.set(sq, true);
        }
        occ
    }

    #[inline]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.occupied[sq.to_index()]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, occupied: bool) {
        self.occupied[sq.to_index()] = occupied;
    }
}

/// 执行走法后后端给出的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// 本步吃掉了将/帅
    pub king_captured: bool,
    /// 走法需要坍缩时得到的测量结果
    pub measurement: Option<u8>,
}

/// 棋盘后端接口
pub trait BoardBackend {
    /// 执行一个语法合法的走法
    fn apply(&mut self, mv: &Move) -> Result<MoveOutcome, XiangqiError>;

    /// 所有待定的测量结算完毕后的占位快照
    fn settled_occupancy(&mut self) -> Occupancy;

    /// (红方将位, 黑方将位)，任一方的将已不在时返回 None
    fn king_squares(&self) -> Option<(Square, Square)>;
}

/// 飞将检测：两将同列或同行，且中间没有任何棋子
pub fn flying_general(occupancy: &Occupancy, kings: (Square, Square)) -> bool {
    let (a, b) = kings;
    if a == b {
        return false;
    }

    if a.file == b.file {
        let min_rank = a.rank.min(b.rank);
        let max_rank = a.rank.max(b.rank);
        return ((min_rank + 1)..max_rank)
            .all(|rank| !occupancy.is_occupied(Square::new(a.file, rank)));
    }

    if a.rank == b.rank {
        let min_file = a.file.min(b.file);
        let max_file = a.file.max(b.file);
        return ((min_file + 1)..max_file)
            .all(|file| !occupancy.is_occupied(Square::new(file, a.rank)));
    }

    false
}

/// 经典参考棋盘
#[derive(Debug, Clone)]
pub struct ClassicalBoard {
    layout: BoardLayout,
    /// 缓存红方将的位置
    red_king: Option<Square>,
    /// 缓存黑方将的位置
    black_king: Option<Square>,
    rng: StdRng,
}

impl ClassicalBoard {
    /// 从开局布局创建棋盘，要求双方各有一个将
    pub fn from_layout(
        layout: BoardLayout,
        seed: Option<u64>,
    ) -> Result<ClassicalBoard, XiangqiError> {
        let mut red_king = None;
        let mut black_king = None;

        for &sq in &layout.king_squares {
            let slot = match layout.get(sq).map(|p| p.color) {
                Some(Color::Red) => &mut red_king,
                Some(Color::Black) => &mut black_king,
                None => continue,
            };
            if slot.replace(sq).is_some() {
                return Err(XiangqiError::InvalidGeneralCount(layout.king_squares.len()));
            }
        }

        if red_king.is_none() || black_king.is_none() {
            return Err(XiangqiError::InvalidGeneralCount(layout.king_squares.len()));
        }

        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(ClassicalBoard {
            layout,
            red_king,
            black_king,
            rng,
        })
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// 当前局面的 FEN
    pub fn to_fen(&self, turn: Color) -> String {
        to_fen(&self.layout, turn)
    }

    /// 检查 `from` 上的棋子能否落到 `to`，返回该棋子
    fn check_destination(&self, from: Square, to: Square) -> Result<Piece, XiangqiError> {
        if from == to {
            return Err(XiangqiError::RejectedMove(format!("{} moves onto itself", from)));
        }
        let piece = self
            .layout
            .get(from)
            .ok_or_else(|| XiangqiError::RejectedMove(format!("no piece at {}", from)))?;

        if let Some(target) = self.layout.get(to) {
            if target.color == piece.color {
                return Err(XiangqiError::RejectedMove(format!(
                    "{} is occupied by a {} piece",
                    to, target.color
                )));
            }
        }

        Ok(piece)
    }

    /// 把 `from` 上的棋子移到 `to`，返回被吃的棋子
    fn relocate(&mut self, from: Square, to: Square) -> Result<Option<Piece>, XiangqiError> {
        let piece = self.check_destination(from, to)?;
        let captured = self.layout.get(to);

        self.layout.set(from, None);
        self.layout.set(to, Some(piece));

        // 更新将的位置缓存
        if piece.kind == PieceKind::King {
            match piece.color {
                Color::Red => self.red_king = Some(to),
                Color::Black => self.black_king = Some(to),
            }
        }

        // 如果吃掉了将，清除缓存
        if let Some(cap) = captured {
            if cap.kind == PieceKind::King {
                match cap.color {
                    Color::Red => self.red_king = None,
                    Color::Black => self.black_king = None,
                }
            }
        }

        Ok(captured)
    }
}

impl BoardBackend for ClassicalBoard {
    fn apply(&mut self, mv: &Move) -> Result<MoveOutcome, XiangqiError> {
        let (captured, measurement) = match mv.shape {
            MoveShape::Plain { source, target } => (self.relocate(source, target)?, None),
            MoveShape::Split {
                source,
                target,
                target2,
            } => {
                if target == target2 {
                    return Err(XiangqiError::RejectedMove(format!(
                        "split targets must differ, got {} twice",
                        target
                    )));
                }
                // 两个终点都必须可落子，坍缩结果不能决定走法是否合法
                self.check_destination(source, target)?;
                self.check_destination(source, target2)?;

                // 没有给出测量结果时现场坍缩
                let bit = match mv.measurement {
                    Some(bit) => bit,
                    None => self.rng.gen_range(0..2),
                };
                let dest = if bit == 0 { target } else { target2 };
                debug!("split {} collapsed to {} (m{})", mv, dest, bit);
                (self.relocate(source, dest)?, Some(bit))
            }
            MoveShape::Merge {
                source,
                source2,
                target,
            } => {
                let from = match (self.layout.get(source), self.layout.get(source2)) {
                    (Some(_), None) => source,
                    (None, Some(_)) => source2,
                    (Some(_), Some(_)) => {
                        return Err(XiangqiError::RejectedMove(format!(
                            "both {} and {} are occupied",
                            source, source2
                        )))
                    }
                    (None, None) => {
                        return Err(XiangqiError::RejectedMove(format!(
                            "no piece at {} or {}",
                            source, source2
                        )))
                    }
                };
                (self.relocate(from, target)?, None)
            }
        };

        let king_captured = captured.map_or(false, |p| p.kind == PieceKind::King);
        if king_captured {
            warn!("general captured by {}", mv);
        }

        Ok(MoveOutcome {
            king_captured,
            measurement,
        })
    }

    fn settled_occupancy(&mut self) -> Occupancy {
        Occupancy::from_layout(&self.layout)
    }

    fn king_squares(&self) -> Option<(Square, Square)> {
        Some((self.red_king?, self.black_king?))
    }
}
