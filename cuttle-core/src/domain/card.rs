use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Card rank. Serialized form matches the wire strings: `"A"`, `"2"` ..
/// `"10"`, `"J"`, `"Q"`, `"K"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Numeric value, ace low: A=1 .. K=13.
    pub fn value(&self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
        }
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        Rank::ALL.into_iter().find(|r| r.value() == value)
    }

    /// Single-character code used in compact card notation (`T` for ten).
    pub fn code(&self) -> char {
        match self {
            Rank::Ace => 'A',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            other => (b'0' + other.value()) as char,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Card suit. Serialized lowercase (`"hearts"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn code(&self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A playing card. Equality is on (rank, suit); duplicates inside a zone are
/// representable and legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Compact notation, e.g. `AH`, `TC`.
    pub fn code(&self) -> String {
        format!("{}{}", self.rank.code(), self.suit.code())
    }

    /// The full 52-card deck in suit-major order.
    pub fn standard_deck() -> Vec<Card> {
        let mut deck = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                deck.push(Card::new(rank, suit));
            }
        }
        deck
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rank, self.suit)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardParseError {
    #[error("card notation too short: {0:?}")]
    TooShort(String),
    #[error("unknown rank: {0:?}")]
    UnknownRank(String),
    #[error("unknown suit: {0:?}")]
    UnknownSuit(char),
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Parses compact notation: a rank code (`A`, `2`..`9`, `10` or `T`,
    /// `J`, `Q`, `K`) followed by a suit character (`C`, `D`, `H`, `S`).
    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() < 2 {
            return Err(CardParseError::TooShort(s.to_string()));
        }
        let suit_char = trimmed
            .chars()
            .last()
            .ok_or_else(|| CardParseError::TooShort(s.to_string()))?
            .to_ascii_uppercase();
        let rank_part = &trimmed[..trimmed.len() - suit_char.len_utf8()];

        let suit = Suit::ALL
            .into_iter()
            .find(|su| su.code() == suit_char)
            .ok_or(CardParseError::UnknownSuit(suit_char))?;

        let rank_upper = rank_part.to_ascii_uppercase();
        let rank = match rank_upper.as_str() {
            "T" => Some(Rank::Ten),
            other => Rank::ALL.into_iter().find(|r| r.as_str() == other),
        }
        .ok_or_else(|| CardParseError::UnknownRank(rank_part.to_string()))?;

        Ok(Card::new(rank, suit))
    }
}
