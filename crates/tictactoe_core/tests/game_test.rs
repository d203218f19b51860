//! Tests for the game engine and rule engine.

use tictactoe_core::{
    Board, Game, Move, MoveError, Outcome, Player, Position, is_legal_move, outcome, winning_line,
};

fn board(marks: &str) -> Board {
    let mut out = [None; 9];
    for (i, c) in marks.chars().enumerate() {
        out[i] = match c {
            'X' => Some(Player::X),
            'O' => Some(Player::O),
            _ => None,
        };
    }
    Board::from_marks(out)
}

#[test]
fn test_opening_sequence_stays_in_progress() {
    let mut game = Game::new();
    assert_eq!(game.make_move(4), Ok(Outcome::InProgress));
    assert_eq!(game.make_move(0), Ok(Outcome::InProgress));
    assert_eq!(game.make_move(8), Ok(Outcome::InProgress));
    assert_eq!(*game.board(), board("O___X___X"));
    assert_eq!(game.to_move(), Player::O);
}

#[test]
fn test_top_row_win_keeps_cursor() {
    let mut game = Game::replay(&[
        Move::new(Player::X, Position::TopLeft),
        Move::new(Player::O, Position::MiddleLeft),
        Move::new(Player::X, Position::TopCenter),
        Move::new(Player::O, Position::Center),
    ])
    .expect("Valid replay");
    assert_eq!(*game.board(), board("XX_OO____"));

    assert_eq!(game.make_move(2), Ok(Outcome::Won(Player::X)));
    assert_eq!(game.winning_line().map(|l| l.indices()), Some([0, 1, 2]));
    assert_eq!(game.to_move(), Player::X);
    assert_eq!(game.make_move(5), Err(MoveError::GameOver));
    assert_eq!(game.history().len(), 5);
}

#[test]
fn test_full_board_without_line_is_draw() {
    let b = board("XOXOXOOXO");
    assert_eq!(winning_line(&b), None);
    assert_eq!(outcome(&b), Outcome::Draw);
}

#[test]
fn test_rejected_move_does_not_advance_cursor() {
    let mut game = Game::new();
    game.make_move(4).unwrap();
    let before = game.clone();
    assert_eq!(game.make_move(4), Err(MoveError::CellOccupied(Position::Center)));
    assert_eq!(game.make_move(42), Err(MoveError::InvalidIndex(42)));
    assert_eq!(game.play(0, Player::X), Err(MoveError::WrongPlayer(Player::X)));
    assert_eq!(game, before);
}

#[test]
fn test_replay_rejects_out_of_turn() {
    let result = Game::replay(&[
        Move::new(Player::X, Position::Center),
        Move::new(Player::X, Position::TopLeft),
    ]);
    assert_eq!(result, Err(MoveError::WrongPlayer(Player::X)));
}

/// Walks every game reachable by alternating legal moves from the empty board.
fn walk(game: &Game, visited: &mut usize) {
    *visited += 1;
    let b = *game.board();
    let has_line = winning_line(&b).is_some();
    let full = b.is_full();

    match game.outcome() {
        Outcome::InProgress => assert!(!has_line && !full),
        Outcome::Won(player) => {
            assert!(has_line);
            assert_eq!(winning_line(&b).map(|l| l.player), Some(player));
            // The winner made the last move and the cursor stayed on them.
            assert_eq!(game.to_move(), player);
            assert_eq!(game.history().last().map(|m| m.player), Some(player));
        }
        Outcome::Draw => assert!(!has_line && full),
    }
    assert!(game.is_consistent());
    assert_eq!(winning_line(&b), winning_line(&b));

    if game.is_over() {
        assert!((0..9).all(|i| !is_legal_move(&b, i, game.to_move(), game.to_move())));
        return;
    }

    let turn = game.to_move();
    for index in 0..9 {
        let legal = is_legal_move(&b, index, turn, turn);
        assert_eq!(legal, b.is_empty(Position::from_index(index).unwrap()));
        assert!(!is_legal_move(&b, index, turn.opponent(), turn));
        if legal {
            let mut next = game.clone();
            let outcome = next.make_move(index).expect("legal move");
            if !outcome.is_terminal() {
                assert_eq!(next.to_move(), turn.opponent());
            }
            walk(&next, visited);
        }
    }
}

#[test]
fn test_every_reachable_game_is_classified() {
    let mut visited = 0;
    walk(&Game::new(), &mut visited);
    // Number of nodes in the full tic-tac-toe game tree, root included.
    assert_eq!(visited, 549_946);
}
