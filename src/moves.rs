//! 量子象棋走法记谱
//!
//! 格式：`<起点终点>[.m<测量结果>][:<走法类型>[:<走法变体>]]`
//!
//! 起点终点有三种形状：
//! - 普通走法：`a1a2`
//! - 分裂走法（一个起点，两个终点）：`b1^a3c3`
//! - 合并走法（两个起点，一个终点）：`a3b1^c3`
//!
//! 测量后缀 `.m0` / `.m1` 记录走法在坍缩时得到的结果。

use std::fmt;
use std::str::FromStr;

use crate::error::XiangqiError;
use crate::types::{MoveType, MoveVariant, Square};

/// 走法的形状
///
/// 一个走法至多有一个“双端点”，不存在两个起点加两个终点的情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveShape {
    Plain {
        source: Square,
        target: Square,
    },
    Split {
        source: Square,
        target: Square,
        target2: Square,
    },
    Merge {
        source: Square,
        source2: Square,
        target: Square,
    },
}

/// 量子象棋走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub shape: MoveShape,
    pub move_type: Option<MoveType>,
    pub move_variant: Option<MoveVariant>,
    /// 坍缩结果，0 或 1
    pub measurement: Option<u8>,
}

impl Move {
    fn with_shape(shape: MoveShape) -> Self {
        Move {
            shape,
            move_type: Some(MoveType::UnspecifiedStandard),
            move_variant: Some(MoveVariant::Unspecified),
            measurement: None,
        }
    }

    /// 创建普通走法
    pub fn plain(source: Square, target: Square) -> Self {
        Move::with_shape(MoveShape::Plain { source, target })
    }

    /// 创建分裂走法
    pub fn split(source: Square, target: Square, target2: Square) -> Self {
        Move::with_shape(MoveShape::Split {
            source,
            target,
            target2,
        })
    }

    /// 创建合并走法
    pub fn merge(source: Square, source2: Square, target: Square) -> Self {
        Move::with_shape(MoveShape::Merge {
            source,
            source2,
            target,
        })
    }

    /// 附带测量结果，只能是 0 或 1
    pub fn with_measurement(mut self, measurement: u8) -> Self {
        debug_assert!(measurement <= 1, "measurement must be 0 or 1, got {}", measurement);
        self.measurement = Some(measurement);
        self
    }

    /// 附带走法类型和变体（由合法性分析器填写）
    pub fn with_type(mut self, move_type: MoveType, move_variant: MoveVariant) -> Self {
        self.move_type = Some(move_type);
        self.move_variant = Some(move_variant);
        self
    }

    pub fn source(&self) -> Square {
        match self.shape {
            MoveShape::Plain { source, .. }
            | MoveShape::Split { source, .. }
            | MoveShape::Merge { source, .. } => source,
        }
    }

    pub fn target(&self) -> Square {
        match self.shape {
            MoveShape::Plain { target, .. }
            | MoveShape::Split { target, .. }
            | MoveShape::Merge { target, .. } => target,
        }
    }

    pub fn source2(&self) -> Option<Square> {
        match self.shape {
            MoveShape::Merge { source2, .. } => Some(source2),
            _ => None,
        }
    }

    pub fn target2(&self) -> Option<Square> {
        match self.shape {
            MoveShape::Split { target2, .. } => Some(target2),
            _ => None,
        }
    }

    pub fn is_split_move(&self) -> bool {
        matches!(self.shape, MoveShape::Split { .. })
    }

    pub fn is_merge_move(&self) -> bool {
        matches!(self.shape, MoveShape::Merge { .. })
    }

    pub fn has_measurement(&self) -> bool {
        self.measurement.is_some()
    }

    /// 撤回这一步的走法形状（普通走法交换起止，分裂与合并互逆）
    pub fn reversed_shape(&self) -> MoveShape {
        match self.shape {
            MoveShape::Plain { source, target } => MoveShape::Plain {
                source: target,
                target: source,
            },
            MoveShape::Split {
                source,
                target,
                target2,
            } => MoveShape::Merge {
                source: target,
                source2: target2,
                target: source,
            },
            MoveShape::Merge {
                source,
                source2,
                target,
            } => MoveShape::Split {
                source: target,
                target: source,
                target2: source2,
            },
        }
    }

    /// 判断本走法是否恰好撤回了 `other`（忽略测量结果和类型）
    pub fn reverses(&self, other: &Move) -> bool {
        self.shape == other.reversed_shape()
    }

    /// 从记谱字符串解析
    pub fn from_notation(s: &str) -> Result<Move, XiangqiError> {
        let s = s.trim();

        // 类型限定部分：`:TYPE:VARIANT`
        let mut parts = s.split(':');
        let move_text = parts.next().unwrap_or_default();
        let move_type = parts
            .next()
            .map(|name| {
                MoveType::from_name(name).ok_or_else(|| XiangqiError::UnknownMoveType(name.into()))
            })
            .transpose()?;
        let move_variant = parts
            .next()
            .map(|name| {
                MoveVariant::from_name(name)
                    .ok_or_else(|| XiangqiError::UnknownMoveVariant(name.into()))
            })
            .transpose()?;
        if parts.next().is_some() {
            return Err(XiangqiError::InvalidMoveSyntax(s.to_string()));
        }

        // 测量后缀：`.mD`
        let (body, measurement) = match move_text.split_once('.') {
            Some((body, suffix)) => (body, Some(parse_measurement(suffix, s)?)),
            None => (move_text, None),
        };

        let chars: Vec<char> = body.chars().collect();
        let carets = chars.iter().filter(|&&c| c == '^').count();
        let syntax_error = || XiangqiError::InvalidMoveSyntax(s.to_string());

        let shape = match carets {
            0 => {
                if chars.len() != 4 {
                    return Err(syntax_error());
                }
                MoveShape::Plain {
                    source: square_at(&chars, 0)?,
                    target: square_at(&chars, 2)?,
                }
            }
            1 => {
                // 只允许 s1^t1t2 和 s1s2^t1 两种写法
                let caret = chars.iter().position(|&c| c == '^').unwrap_or_default();
                if chars.len() != 7 {
                    return Err(syntax_error());
                }
                match caret {
                    2 => MoveShape::Split {
                        source: square_at(&chars, 0)?,
                        target: square_at(&chars, 3)?,
                        target2: square_at(&chars, 5)?,
                    },
                    4 => MoveShape::Merge {
                        source: square_at(&chars, 0)?,
                        source2: square_at(&chars, 2)?,
                        target: square_at(&chars, 5)?,
                    },
                    _ => return Err(syntax_error()),
                }
            }
            _ => return Err(syntax_error()),
        };

        Ok(Move {
            shape,
            move_type: Some(move_type.unwrap_or(MoveType::UnspecifiedStandard)),
            move_variant: Some(move_variant.unwrap_or(MoveVariant::Unspecified)),
            measurement,
        })
    }

    /// 转换为记谱字符串
    ///
    /// `include_type` 为真时附加 `:类型:变体`（仅附加非空的部分）
    pub fn to_notation(&self, include_type: bool) -> String {
        let mut movestr = match self.shape {
            MoveShape::Plain { source, target } => format!("{}{}", source, target),
            MoveShape::Split {
                source,
                target,
                target2,
            } => format!("{}^{}{}", source, target, target2),
            MoveShape::Merge {
                source,
                source2,
                target,
            } => format!("{}{}^{}", source, source2, target),
        };

        if let Some(m) = self.measurement {
            movestr.push_str(&format!(".m{}", m));
        }

        if include_type {
            if let Some(t) = self.move_type {
                movestr.push(':');
                movestr.push_str(t.name());
            }
            if let Some(v) = self.move_variant {
                movestr.push(':');
                movestr.push_str(v.name());
            }
        }

        movestr
    }
}

/// 解析 `m0` / `m1`
fn parse_measurement(suffix: &str, text: &str) -> Result<u8, XiangqiError> {
    let invalid = || XiangqiError::InvalidMeasurementSuffix(text.to_string());
    let payload = suffix.strip_prefix('m').ok_or_else(invalid)?;
    match payload {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => Err(invalid()),
    }
}

/// 取 `chars[start..start + 2]` 作为格子坐标
fn square_at(chars: &[char], start: usize) -> Result<Square, XiangqiError> {
    let token: String = chars[start..start + 2].iter().collect();
    Square::parse(&token)
}

impl FromStr for Move {
    type Err = XiangqiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_notation(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation(false))
    }
}
