//! 测试局面库
//!
//! 提供命名的 FEN 测试局面，方便测试和调试
//!
//! 约定：红方（大写）在上方 rank 9，黑方（小写）在下方 rank 0

pub use crate::fen::INITIAL_FEN as START;

/// 只剩两将且照面，红方走
pub const KINGS_FACING: &str = "4K4/9/9/9/9/9/9/9/9/4k4 w";

/// 两将错开，黑方走
pub const KINGS_ONLY_BLACK_TO_MOVE: &str = "3K5/9/9/9/9/9/9/9/9/4k4 b";

/// 红车挡在两将之间，红方走（车离开即飞将）
pub const EXPOSE_GENERAL: &str = "4K4/9/9/9/4R4/9/9/9/9/4k4 w";

/// 黑车贴着红帅，黑方走（e1e0 吃帅）
pub const ROOK_TAKES_GENERAL: &str = "4k4/9/9/9/9/9/9/9/4r4/4K4 b";

/// 使用原始字母（g/s）的局面
pub const GENERAL_SOLDIER_LETTERS: &str = "3aga3/9/9/9/4s4/9/9/9/9/3AGA3 w";

/// 所有命名局面
pub const ALL: [(&str, &str); 6] = [
    ("START", START),
    ("KINGS_FACING", KINGS_FACING),
    ("KINGS_ONLY_BLACK_TO_MOVE", KINGS_ONLY_BLACK_TO_MOVE),
    ("EXPOSE_GENERAL", EXPOSE_GENERAL),
    ("ROOK_TAKES_GENERAL", ROOK_TAKES_GENERAL),
    ("GENERAL_SOLDIER_LETTERS", GENERAL_SOLDIER_LETTERS),
];

/// 按名字查找局面
pub fn by_name(name: &str) -> Option<&'static str> {
    ALL.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, fen)| *fen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;

    #[test]
    fn test_all_positions_load() {
        for (name, fen) in ALL {
            let state = parse_fen(fen).unwrap_or_else(|e| panic!("{}: {}", name, e));
            assert_eq!(state.layout.king_squares.len(), 2, "{}", name);
        }
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("kings_facing"), Some(KINGS_FACING));
        assert_eq!(by_name("nope"), None);
    }
}
