use ratatui::style::{palette::tailwind, Color};

/// Palette per screen: todos in blue, contact in emerald.
pub const TODOS_PALETTE: &tailwind::Palette = &tailwind::BLUE;
pub const CONTACT_PALETTE: &tailwind::Palette = &tailwind::EMERALD;

pub struct Theme {
    pub buffer_bg: Color,
    pub border: Color,
    pub row_fg: Color,
    pub selected_fg: Color,
    pub accent: Color,
    pub error_fg: Color,
    pub success_fg: Color,
    pub muted_fg: Color,
    pub footer_border: Color,
}

impl Theme {
    pub const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            border: color.c900,
            row_fg: tailwind::SLATE.c200,
            selected_fg: color.c400,
            accent: color.c500,
            error_fg: tailwind::RED.c400,
            success_fg: tailwind::EMERALD.c400,
            muted_fg: tailwind::SLATE.c500,
            footer_border: color.c400,
        }
    }
}
