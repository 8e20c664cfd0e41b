//! 对局状态机
//!
//! 每个完整回合结束后按固定优先级判断胜负：
//! 1. 当前玩家认输，对方胜
//! 2. 本步吃掉了将，走棋方胜
//! 3. 坍缩后两将照面（飞将），走棋方暴露了自己的将，对方胜
//! 4. 走棋方连续往返重复走子达到上限，和棋
//! 5. 否则继续，轮到对方
//!
//! 前面的规则一旦成立，后面的规则不再计算。

use log::{debug, info, warn};

use crate::board::{flying_general, BoardBackend, ClassicalBoard};
use crate::error::XiangqiError;
use crate::fen::parse_fen;
use crate::moves::Move;
use crate::types::{Color, GameResult};

/// 帮助信息
pub const HELP_TEXT: &str = "
    Each location on the board is represented by two characters [abcdefghi][0-9], i.e. from a0 to i9. You may input (s=source, t=target)
    - s1t1 to do a slide move, e.g. \"a1a4\";
    - s1^t1t2 to do a split move, e.g. \"a1^b1a2\";
    - s1s2^t1 to do a merge move, e.g. \"b1a2^a1\";
    Append .m0 or .m1 to record a measurement outcome, e.g. \"a1^b1a2.m0\".
Other commands:
    - \"exit\" or \"quit\" to resign
    - \"help\": to see this message again
";

/// 对局配置
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// 往返重复次数上限，None 表示不判和
    pub repetition_limit: Option<u32>,
    /// 随机种子（经典棋盘的现场坍缩）
    pub seed: Option<u64>,
    /// 0 号（红方）和 1 号（黑方）玩家名字
    pub player_names: [String; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            repetition_limit: None,
            seed: None,
            player_names: ["Player_0".to_string(), "Player_1".to_string()],
        }
    }
}

/// 一次输入的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// 玩家请求帮助，状态不变
    Help,
    /// 输入无效或走法被拒绝，同一玩家重新输入
    Rejected(XiangqiError),
    /// 当前玩家认输
    Resigned(GameResult),
    /// 走法已执行（带上后端给出的测量结果）
    Played { mv: Move, result: GameResult },
    /// 对局已经结束
    AlreadyOver(GameResult),
}

/// 一局对局的全部状态
pub struct GameSession<B: BoardBackend> {
    board: B,
    config: GameConfig,
    current_player: Color,
    /// 已完成的回合数
    turn: u32,
    resigned: Option<Color>,
    /// 双方各自的走子历史（用于重复检测）
    history: [Vec<Move>; 2],
    /// 全局走子记录
    record: Vec<(Color, Move)>,
    result: GameResult,
}

impl GameSession<ClassicalBoard> {
    /// 从 FEN 创建使用经典棋盘的对局
    pub fn from_fen(fen: &str, config: GameConfig) -> Result<Self, XiangqiError> {
        let state = parse_fen(fen)?;
        let board = ClassicalBoard::from_layout(state.layout, config.seed)?;
        Ok(GameSession::new(board, state.turn, config))
    }
}

impl<B: BoardBackend> GameSession<B> {
    pub fn new(board: B, first_player: Color, config: GameConfig) -> Self {
        info!(
            "new game: {} vs {}, {} to move",
            config.player_names[0], config.player_names[1], first_player
        );
        GameSession {
            board,
            config,
            current_player: first_player,
            turn: 0,
            resigned: None,
            history: [Vec::new(), Vec::new()],
            record: Vec::new(),
            result: GameResult::Continue,
        }
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[inline]
    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn player_name(&self, color: Color) -> &str {
        &self.config.player_names[color.index()]
    }

    /// 已执行的走法记录
    pub fn record(&self) -> &[(Color, Move)] {
        &self.record
    }

    /// 当前玩家认输
    pub fn resign(&mut self) {
        self.resigned = Some(self.current_player);
    }

    /// 处理一行玩家输入
    pub fn submit(&mut self, input: &str) -> TurnOutcome {
        if self.result.is_over() {
            return TurnOutcome::AlreadyOver(self.result);
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("help") {
            return TurnOutcome::Help;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            info!("{} resigns", self.player_name(self.current_player));
            self.resign();
            self.result = self.game_over(false);
            return TurnOutcome::Resigned(self.result);
        }

        match self.play(input) {
            Ok((mv, result)) => TurnOutcome::Played { mv, result },
            Err(e) => {
                warn!("rejected input '{}': {}", input, e);
                TurnOutcome::Rejected(e)
            }
        }
    }

    /// 解析并执行一步走法，然后判断胜负
    fn play(&mut self, input: &str) -> Result<(Move, GameResult), XiangqiError> {
        let mv = Move::from_notation(input)?;
        let outcome = self.board.apply(&mv)?;

        let played = match (mv.measurement, outcome.measurement) {
            (None, Some(bit)) => mv.with_measurement(bit),
            _ => mv,
        };
        debug!("{} played {}", self.current_player, played);

        self.history[self.current_player.index()].push(played);
        self.record.push((self.current_player, played));

        let result = self.game_over(outcome.king_captured);
        if result.is_over() {
            info!("game over after {}: {:?}", played, result);
        } else {
            self.turn += 1;
            self.current_player = self.current_player.opposite();
        }
        self.result = result;

        Ok((played, result))
    }

    /// 按优先级判断本回合结束后的对局状态
    pub fn game_over(&mut self, king_captured: bool) -> GameResult {
        if let Some(quitter) = self.resigned {
            return GameResult::Win(quitter.opposite());
        }

        if king_captured {
            return GameResult::Win(self.current_player);
        }

        if let Some(kings) = self.board.king_squares() {
            let occupancy = self.board.settled_occupancy();
            if flying_general(&occupancy, kings) {
                return GameResult::Win(self.current_player.opposite());
            }
        }

        if self.is_repeated_move(self.current_player) {
            return GameResult::Draw;
        }

        GameResult::Continue
    }

    /// 该玩家最近的走子是否构成 N 次连续往返
    fn is_repeated_move(&self, player: Color) -> bool {
        let limit = match self.config.repetition_limit {
            Some(n) if n > 0 => n as usize,
            _ => return false,
        };
        let moves = &self.history[player.index()];
        let needed = 2 * limit;
        if moves.len() < needed {
            return false;
        }
        moves[moves.len() - needed..]
            .windows(2)
            .all(|w| w[1].reverses(&w[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MoveOutcome, Occupancy};
    use crate::fen::INITIAL_FEN;
    use crate::test_positions;
    use crate::types::Square;

    fn session(fen: &str) -> GameSession<ClassicalBoard> {
        let config = GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        };
        GameSession::from_fen(fen, config).unwrap()
    }

    /// 只返回预设信号的棋盘
    struct ScriptedBoard {
        king_captured: bool,
        kings: Option<(Square, Square)>,
        occupancy: Occupancy,
        settle_calls: usize,
    }

    impl BoardBackend for ScriptedBoard {
        fn apply(&mut self, _mv: &Move) -> Result<MoveOutcome, XiangqiError> {
            Ok(MoveOutcome {
                king_captured: self.king_captured,
                measurement: None,
            })
        }

        fn settled_occupancy(&mut self) -> Occupancy {
            self.settle_calls += 1;
            self.occupancy.clone()
        }

        fn king_squares(&self) -> Option<(Square, Square)> {
            self.kings
        }
    }

    fn facing_kings() -> ScriptedBoard {
        ScriptedBoard {
            king_captured: false,
            kings: Some((Square::new(4, 9), Square::new(4, 0))),
            occupancy: Occupancy::empty(),
            settle_calls: 0,
        }
    }

    #[test]
    fn test_plain_move_continues() {
        let mut game = session(INITIAL_FEN);
        assert_eq!(game.current_player(), Color::Red);

        let outcome = game.submit("b7e7");
        assert!(matches!(
            outcome,
            TurnOutcome::Played {
                result: GameResult::Continue,
                ..
            }
        ));
        assert_eq!(game.current_player(), Color::Black);
        assert_eq!(game.turn(), 1);
        assert_eq!(game.record().len(), 1);
    }

    #[test]
    fn test_help_does_not_change_state() {
        let mut game = session(INITIAL_FEN);
        assert_eq!(game.submit("help"), TurnOutcome::Help);
        assert_eq!(game.submit("  HELP "), TurnOutcome::Help);
        assert_eq!(game.current_player(), Color::Red);
        assert_eq!(game.turn(), 0);
        assert!(game.record().is_empty());
    }

    #[test]
    fn test_invalid_input_reprompts_same_player() {
        let mut game = session(INITIAL_FEN);
        assert!(matches!(
            game.submit("a1^a2"),
            TurnOutcome::Rejected(XiangqiError::InvalidMoveSyntax(_))
        ));
        assert!(matches!(
            game.submit("z1a2"),
            TurnOutcome::Rejected(XiangqiError::InvalidSquare(_))
        ));
        // 起点没有子
        assert!(matches!(
            game.submit("e5e4"),
            TurnOutcome::Rejected(XiangqiError::RejectedMove(_))
        ));
        assert_eq!(game.current_player(), Color::Red);
        assert_eq!(game.turn(), 0);
        assert_eq!(game.result(), GameResult::Continue);
    }

    #[test]
    fn test_resign_other_player_wins() {
        let mut game = session(INITIAL_FEN);
        game.submit("b7e7");
        assert_eq!(
            game.submit("exit"),
            TurnOutcome::Resigned(GameResult::Win(Color::Red))
        );
        assert_eq!(game.turn(), 1);
        assert_eq!(
            game.submit("a0a1"),
            TurnOutcome::AlreadyOver(GameResult::Win(Color::Red))
        );

        // quit 与 exit 等价
        let mut game = session(INITIAL_FEN);
        assert_eq!(
            game.submit("quit"),
            TurnOutcome::Resigned(GameResult::Win(Color::Black))
        );
        assert_eq!(game.result(), GameResult::Win(Color::Black));
        assert_eq!(game.turn(), 0);
    }

    #[test]
    fn test_resign_beats_king_capture() {
        let mut game = session(INITIAL_FEN);
        game.resign();
        assert_eq!(game.game_over(true), GameResult::Win(Color::Black));
    }

    #[test]
    fn test_king_capture_mover_wins() {
        let mut game = session(test_positions::ROOK_TAKES_GENERAL);
        assert_eq!(game.current_player(), Color::Black);
        let outcome = game.submit("e1e0");
        assert!(matches!(
            outcome,
            TurnOutcome::Played {
                result: GameResult::Win(Color::Black),
                ..
            }
        ));
        // 终局不推进回合
        assert_eq!(game.turn(), 0);
        assert_eq!(game.current_player(), Color::Black);
    }

    #[test]
    fn test_king_capture_skips_flying_general() {
        let mut board = facing_kings();
        board.king_captured = true;
        let mut game = GameSession::new(board, Color::Red, GameConfig::default());
        let outcome = game.submit("a0a1");
        assert!(matches!(
            outcome,
            TurnOutcome::Played {
                result: GameResult::Win(Color::Red),
                ..
            }
        ));
        assert_eq!(game.board().settle_calls, 0);
    }

    #[test]
    fn test_flying_general_other_player_wins() {
        let mut game = session(test_positions::EXPOSE_GENERAL);
        let outcome = game.submit("e5a5");
        assert!(matches!(
            outcome,
            TurnOutcome::Played {
                result: GameResult::Win(Color::Black),
                ..
            }
        ));

        let mut game = GameSession::new(facing_kings(), Color::Black, GameConfig::default());
        assert_eq!(game.game_over(false), GameResult::Win(Color::Red));
    }

    #[test]
    fn test_repetition_draw() {
        let config = GameConfig {
            repetition_limit: Some(2),
            seed: Some(1),
            ..GameConfig::default()
        };
        let mut game = GameSession::from_fen(INITIAL_FEN, config).unwrap();
        let moves = ["a9a8", "a0a1", "a8a9", "a1a0", "a9a8", "a0a1"];
        for mv in moves {
            assert!(matches!(
                game.submit(mv),
                TurnOutcome::Played {
                    result: GameResult::Continue,
                    ..
                }
            ));
        }
        // 红方第二次完整往返
        assert!(matches!(
            game.submit("a8a9"),
            TurnOutcome::Played {
                result: GameResult::Draw,
                ..
            }
        ));
    }

    #[test]
    fn test_repetition_disabled_by_default() {
        let mut game = session(INITIAL_FEN);
        for mv in ["a9a8", "a0a1", "a8a9", "a1a0", "a9a8", "a0a1", "a8a9", "a1a0"] {
            assert!(matches!(
                game.submit(mv),
                TurnOutcome::Played {
                    result: GameResult::Continue,
                    ..
                }
            ));
        }
        assert_eq!(game.turn(), 8);
    }

    #[test]
    fn test_repetition_broken_chain() {
        let config = GameConfig {
            repetition_limit: Some(1),
            ..GameConfig::default()
        };
        let mut game = GameSession::from_fen(INITIAL_FEN, config).unwrap();
        game.submit("a9a8");
        game.submit("a0a1");
        // 走到别处，不是往返
        assert!(matches!(
            game.submit("a8a7"),
            TurnOutcome::Played {
                result: GameResult::Continue,
                ..
            }
        ));
    }

    #[test]
    fn test_split_records_measurement() {
        let mut game = session(INITIAL_FEN);
        let outcome = game.submit("b7^b5e7");
        match outcome {
            TurnOutcome::Played { mv, .. } => {
                assert!(mv.is_split_move());
                assert!(mv.has_measurement());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(game.record()[0].1.has_measurement());
    }

    #[test]
    fn test_player_names() {
        let config = GameConfig {
            player_names: ["Alice".to_string(), "Bob".to_string()],
            ..GameConfig::default()
        };
        let game = GameSession::from_fen(INITIAL_FEN, config).unwrap();
        assert_eq!(game.player_name(Color::Red), "Alice");
        assert_eq!(game.player_name(Color::Black), "Bob");
    }

    #[test]
    fn test_session_requires_two_generals() {
        let err = GameSession::from_fen("9/9/9/9/9/9/9/9/9/4K4 w", GameConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, XiangqiError::InvalidGeneralCount(1));
        assert!(matches!(
            GameSession::from_fen("9/9/9", GameConfig::default()),
            Err(XiangqiError::MalformedBoardDescription { .. })
        ));
    }
}
