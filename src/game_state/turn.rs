//! One ply as a plain value.
//!
//! Castling is recorded by the king's move only; the rook relocation is
//! reconstructed from the king's destination when the turn is applied.

use std::fmt;

use crate::game_state::chess_types::{Field, Piece, PieceType, PlayerColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnAction {
    Move,
    Castle,
    Forfeit,
    Pass,
    PromotionQueen,
    PromotionBishop,
    PromotionKnight,
    PromotionRook,
}

impl TurnAction {
    /// Promotion variants in generation order.
    pub const PROMOTIONS: [TurnAction; 4] = [
        TurnAction::PromotionQueen,
        TurnAction::PromotionBishop,
        TurnAction::PromotionKnight,
        TurnAction::PromotionRook,
    ];

    #[inline]
    pub const fn promotion_piece(self) -> Option<PieceType> {
        match self {
            TurnAction::PromotionQueen => Some(PieceType::Queen),
            TurnAction::PromotionBishop => Some(PieceType::Bishop),
            TurnAction::PromotionKnight => Some(PieceType::Knight),
            TurnAction::PromotionRook => Some(PieceType::Rook),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Turn {
    pub piece: Piece,
    pub from: Field,
    pub to: Field,
    pub action: TurnAction,
}

impl Turn {
    #[inline]
    pub const fn move_to(piece: Piece, from: Field, to: Field) -> Self {
        Self {
            piece,
            from,
            to,
            action: TurnAction::Move,
        }
    }

    /// Castle described by the king's move.
    #[inline]
    pub const fn castle(king: Piece, from: Field, to: Field) -> Self {
        Self {
            piece: king,
            from,
            to,
            action: TurnAction::Castle,
        }
    }

    #[inline]
    pub const fn promotion(pawn: Piece, from: Field, to: Field, action: TurnAction) -> Self {
        Self {
            piece: pawn,
            from,
            to,
            action,
        }
    }

    pub const fn pass(player: PlayerColor) -> Self {
        Self {
            piece: Piece::new(player, PieceType::King),
            from: Field::A1,
            to: Field::A1,
            action: TurnAction::Pass,
        }
    }

    pub const fn forfeit(player: PlayerColor) -> Self {
        Self {
            piece: Piece::new(player, PieceType::King),
            from: Field::A1,
            to: Field::A1,
            action: TurnAction::Forfeit,
        }
    }

    #[inline]
    pub const fn is_promotion(&self) -> bool {
        self.action.promotion_piece().is_some()
    }
}

/// Long algebraic form (`e2e4`, `e7e8q`); pass and forfeit print as `0000`.
impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            TurnAction::Pass | TurnAction::Forfeit => write!(f, "0000"),
            _ => {
                write!(f, "{}{}", self.from, self.to)?;
                if let Some(promoted) = self.action.promotion_piece() {
                    write!(f, "{}", promoted.fen_char())?;
                }
                Ok(())
            }
        }
    }
}
