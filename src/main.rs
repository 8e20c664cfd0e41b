//! Quantum Xiangqi CLI
//!
//! 命令行界面
//!
//! 支持三种用法：
//! 1. 对局模式：两位玩家轮流在 stdin 输入走法
//! 2. 单次命令模式：解析一个走法或一个 FEN
//! 3. Server 模式：长驻进程，通过 stdin/stdout 以 JSON 通信

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use quantum_xiangqi::{
    parse_fen, test_positions, to_board_description, Color, FenState, GameConfig, GameResult,
    GameSession, Move, MoveShape, TurnOutcome, HELP_TEXT, INITIAL_FEN,
};

#[derive(Parser)]
#[command(name = "quantum-xiangqi")]
#[command(about = "Quantum Xiangqi rules core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 开始一局对局
    Play {
        /// 开局 FEN
        #[arg(long, default_value = INITIAL_FEN)]
        fen: String,

        /// 使用命名局面代替 --fen（如 KINGS_FACING）
        #[arg(long)]
        position: Option<String>,

        /// 连续往返多少次判和（不填则不判和）
        #[arg(long)]
        repetition_limit: Option<u32>,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 红方（0 号玩家）名字
        #[arg(long, default_value = "Player_0")]
        red_name: String,

        /// 黑方（1 号玩家）名字
        #[arg(long, default_value = "Player_1")]
        black_name: String,
    },

    /// 解析走法记谱
    Parse {
        /// 走法字符串，如 b1^a3c3.m1
        #[arg(long = "move")]
        notation: String,

        /// 输出时附带走法类型和变体
        #[arg(long)]
        with_type: bool,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 加载 FEN 棋盘
    Load {
        /// FEN 字符串
        #[arg(long, default_value = INITIAL_FEN)]
        fen: String,

        /// 使用命名局面代替 --fen
        #[arg(long)]
        position: Option<String>,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server,
}

#[derive(Serialize, Deserialize)]
struct MoveInfo {
    notation: String,
    shape: String,
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    measurement: Option<u8>,
}

impl MoveInfo {
    fn from_move(mv: &Move, with_type: bool) -> Self {
        let shape = match mv.shape {
            MoveShape::Plain { .. } => "plain",
            MoveShape::Split { .. } => "split",
            MoveShape::Merge { .. } => "merge",
        };
        MoveInfo {
            notation: mv.to_notation(with_type),
            shape: shape.to_string(),
            source: mv.source().to_string(),
            target: mv.target().to_string(),
            source2: mv.source2().map(|s| s.to_string()),
            target2: mv.target2().map(|s| s.to_string()),
            move_type: mv.move_type.map(|t| t.name().to_string()),
            move_variant: mv.move_variant.map(|v| v.name().to_string()),
            measurement: mv.measurement,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PieceInfo {
    square: String,
    piece: char,
}

#[derive(Serialize, Deserialize)]
struct BoardInfo {
    board: String,
    turn: String,
    kings: Vec<String>,
    occupied: usize,
    pieces: Vec<PieceInfo>,
}

impl BoardInfo {
    fn from_state(state: &FenState) -> Self {
        BoardInfo {
            board: to_board_description(&state.layout),
            turn: color_to_str(state.turn).to_string(),
            kings: state
                .layout
                .king_squares
                .iter()
                .map(|s| s.to_string())
                .collect(),
            occupied: state.layout.occupied_count(),
            pieces: state
                .layout
                .occupied()
                .map(|(sq, p)| PieceInfo {
                    square: sq.to_string(),
                    piece: p.to_fen_char(),
                })
                .collect(),
        }
    }
}

// Server 模式的请求和响应结构
#[derive(Serialize, Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default, rename = "move")]
    notation: String,
    #[serde(default)]
    fen: String,
    #[serde(default)]
    with_type: bool,
}

#[derive(Serialize, Deserialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none", rename = "move")]
    mv: Option<MoveInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    board: Option<BoardInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    fn success_move(mv: MoveInfo) -> Self {
        Self {
            ok: true,
            mv: Some(mv),
            ..Default::default()
        }
    }

    fn success_board(board: BoardInfo) -> Self {
        Self {
            ok: true,
            board: Some(board),
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn color_to_str(color: Color) -> &'static str {
    if color == Color::Red { "red" } else { "black" }
}

/// 命名局面优先于 FEN 字符串
fn resolve_fen(fen: String, position: Option<String>) -> String {
    match position {
        Some(name) => match test_positions::by_name(&name) {
            Some(fen) => fen.to_string(),
            None => {
                let names: Vec<&str> = test_positions::ALL.iter().map(|(n, _)| *n).collect();
                eprintln!("Error: unknown position '{}', expected one of: {}", name, names.join(", "));
                std::process::exit(1);
            }
        },
        None => fen,
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let res = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    res.unwrap_or_else(|e| format!("{{\"ok\": false, \"error\": {:?}}}", e.to_string()))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            fen,
            position,
            repetition_limit,
            seed,
            red_name,
            black_name,
        } => {
            let config = GameConfig {
                repetition_limit,
                seed,
                player_names: [red_name, black_name],
            };
            let fen = resolve_fen(fen, position);
            if let Err(e) = run_game(&fen, config) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Parse {
            notation,
            with_type,
            json,
        } => match Move::from_notation(&notation) {
            Ok(mv) => {
                let info = MoveInfo::from_move(&mv, with_type);
                if json {
                    println!("{}", to_json(&info, true));
                } else {
                    println!("{} ({})", info.notation, info.shape);
                    println!("  source:  {}", info.source);
                    if let Some(s2) = &info.source2 {
                        println!("  source2: {}", s2);
                    }
                    println!("  target:  {}", info.target);
                    if let Some(t2) = &info.target2 {
                        println!("  target2: {}", t2);
                    }
                    if let Some(m) = info.measurement {
                        println!("  measurement: {}", m);
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Load {
            fen,
            position,
            json,
        } => match parse_fen(&resolve_fen(fen, position)) {
            Ok(state) => {
                let info = BoardInfo::from_state(&state);
                if json {
                    println!("{}", to_json(&info, true));
                } else {
                    println!("Board: {}", info.board);
                    println!("To move: {}", info.turn);
                    println!("Generals: {}", info.kings.join(", "));
                    println!("Occupied squares: {}", info.occupied);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Server => {
            run_server();
        }
    }
}

/// 对局主循环
fn run_game(fen: &str, config: GameConfig) -> Result<(), quantum_xiangqi::XiangqiError> {
    let mut game = GameSession::from_fen(fen, config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("\n        Welcome to Quantum Chinese Chess!\n");
    println!("{}", HELP_TEXT);
    println!("{}", game.board().to_fen(game.current_player()));

    let mut lines = stdin.lock().lines();
    loop {
        print!(
            "\nIt is {}'s turn to move: ",
            game.player_name(game.current_player())
        );
        let _ = stdout.flush();

        let line = match lines.next() {
            Some(Ok(l)) => l,
            // 输入结束视为当前玩家退出
            _ => "exit".to_string(),
        };

        match game.submit(&line) {
            TurnOutcome::Help => println!("{}", HELP_TEXT),
            TurnOutcome::Rejected(e) => {
                println!("{}", e);
                println!("\nPlease re-enter your move.");
            }
            TurnOutcome::Played { mv, result } => {
                println!("Played {}", mv);
                println!("{}", game.board().to_fen(game.current_player()));
                if announce(&game, result) {
                    break;
                }
            }
            TurnOutcome::Resigned(result) | TurnOutcome::AlreadyOver(result) => {
                announce(&game, result);
                break;
            }
        }
    }

    Ok(())
}

/// 打印终局信息，返回对局是否结束
fn announce<B: quantum_xiangqi::BoardBackend>(game: &GameSession<B>, result: GameResult) -> bool {
    match result {
        GameResult::Continue => false,
        GameResult::Win(color) => {
            println!("{} wins! Game is over.", game.player_name(color));
            true
        }
        GameResult::Draw => {
            println!("Draw! Game is over.");
            true
        }
    }
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        // 解析请求
        let request: ServerRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let response = ServerResponse::error(&format!("Invalid JSON: {}", e));
                println!("{}", to_json(&response, false));
                let _ = stdout.flush();
                continue;
            }
        };

        // 处理命令
        let response = match request.cmd.as_str() {
            "parse" => handle_parse_request(&request),
            "load" => handle_load_request(&request),
            "quit" => break,
            _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
        };

        // 返回响应
        println!("{}", to_json(&response, false));
        let _ = stdout.flush();
    }
}

/// 处理 parse 命令
fn handle_parse_request(request: &ServerRequest) -> ServerResponse {
    match Move::from_notation(&request.notation) {
        Ok(mv) => ServerResponse::success_move(MoveInfo::from_move(&mv, request.with_type)),
        Err(e) => ServerResponse::error(&e.to_string()),
    }
}

/// 处理 load 命令
fn handle_load_request(request: &ServerRequest) -> ServerResponse {
    let fen = if request.fen.is_empty() {
        INITIAL_FEN
    } else {
        request.fen.as_str()
    };
    match parse_fen(fen) {
        Ok(state) => ServerResponse::success_board(BoardInfo::from_state(&state)),
        Err(e) => ServerResponse::error(&format!("Invalid FEN: {}", e)),
    }
}
