use std::fmt;

use crate::card::CatalogCard;

/// Single-letter color classification written into the enriched table.
///
/// `Unknown` is the ambiguous-colorless case: empty color identity with no
/// artifact/Eldrazi/land signal and no explicit colorless evidence. It is
/// distinct from `Colorless` in the type system; `Unknown` renders as the
/// empty string in every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Gold,
    Colorless,
    Land,
    Unknown,
}

impl Color {
    /// The code written into the table's Color column.
    pub fn code(&self) -> &'static str {
        match self {
            Self::White => "W",
            Self::Blue => "U",
            Self::Black => "B",
            Self::Red => "R",
            Self::Green => "G",
            Self::Gold => "Gd",
            Self::Colorless => "C",
            Self::Land => "L",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Derive a color classification from a catalog card.
///
/// Priority order:
/// 1. Type line containing "Land" is `Land`. Lands have empty color
///    identity, so this check must come first.
/// 2. Empty color identity:
///    a. type line containing "Artifact" or "Eldrazi" is `Colorless`;
///    b. colors list present-and-empty, or color indicator containing
///       "Colorless", is `Colorless`;
///    c. otherwise `Unknown`.
/// 3. Two or more identity letters is `Gold`.
/// 4. Exactly one identity letter maps to that color if it is one of
///    W/U/B/R/G, else `Unknown`.
///
/// Total over all well-formed cards: absent optional fields classify as if
/// empty, never panic.
pub fn classify(card: &CatalogCard) -> Color {
    let identity = &card.color_identity;
    let type_line = &card.type_line;

    if type_line.contains("Land") {
        return Color::Land;
    }

    if identity.is_empty() {
        if type_line.contains("Artifact") || type_line.contains("Eldrazi") {
            return Color::Colorless;
        }
        let colors_empty = matches!(card.colors.as_deref(), Some([]));
        let indicator_colorless = card
            .color_indicator
            .as_deref()
            .is_some_and(|ind| ind.iter().any(|c| c == "Colorless"));
        if colors_empty || indicator_colorless {
            return Color::Colorless;
        }
        return Color::Unknown;
    }

    if identity.len() > 1 {
        return Color::Gold;
    }

    match identity[0].as_str() {
        "W" => Color::White,
        "U" => Color::Blue,
        "B" => Color::Black,
        "R" => Color::Red,
        "G" => Color::Green,
        _ => Color::Unknown,
    }
}
