//! Proximity to presentation tables.

use crate::domain::models::{Color, Icon, Proximity};

/// Background color shown for a proximity bucket
pub fn color_for(proximity: Proximity) -> Color {
    match proximity {
        Proximity::Immediate => Color::Green,
        Proximity::Near => Color::Blue,
        Proximity::Far => Color::Red,
        Proximity::Unknown => Color::Black,
    }
}

/// Progress icon shown for a proximity bucket
pub fn icon_for(proximity: Proximity) -> Icon {
    match proximity {
        Proximity::Immediate => Icon::TargetClose,
        Proximity::Near | Proximity::Far | Proximity::Unknown => Icon::Searching,
    }
}
